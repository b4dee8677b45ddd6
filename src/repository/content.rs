use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;

use super::{in_transaction, now_timestamp, RepositoryError};
use crate::db::models::{Comment, CommentRow, Like, PostRow, SkillPost};
use crate::state::DbPool;

/// Result of toggling a like on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

/// What a cascading post delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeletedPost {
    pub comments: usize,
    pub likes: usize,
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn insert_post(&self, post: &SkillPost) -> Result<(), RepositoryError>;

    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<PostRow>, RepositoryError>;

    async fn find_post(&self, id: &str) -> Result<Option<PostRow>, RepositoryError>;

    async fn posts_by_author(&self, author_id: &str) -> Result<Vec<PostRow>, RepositoryError>;

    /// Delete a post together with its comments and likes in one transaction.
    /// Returns `NotFound` when the post does not exist.
    async fn delete_post(&self, id: &str) -> Result<DeletedPost, RepositoryError>;

    async fn insert_comment(&self, comment: &Comment) -> Result<(), RepositoryError>;

    async fn find_comment(&self, id: &str) -> Result<Option<CommentRow>, RepositoryError>;

    /// Comments on a post, newest first.
    async fn comments_for_post(&self, post_id: &str) -> Result<Vec<CommentRow>, RepositoryError>;

    async fn comments_by_author(&self, author_id: &str)
        -> Result<Vec<CommentRow>, RepositoryError>;

    async fn delete_comment(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Add the user's like if absent, remove it if present. Returns `NotFound`
    /// when the post does not exist at the time of the toggle.
    async fn toggle_like(&self, user_id: &str, post_id: &str)
        -> Result<LikeState, RepositoryError>;

    async fn likes_for_post(&self, post_id: &str) -> Result<Vec<Like>, RepositoryError>;

    async fn likes_by_user(&self, user_id: &str) -> Result<Vec<Like>, RepositoryError>;
}

pub type DynContentRepository = Arc<dyn ContentRepository>;

pub struct SqliteContentRepository {
    pool: DbPool,
}

impl SqliteContentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const POST_SELECT: &str = "
    SELECT p.id, p.title, p.content, p.media_url, p.author_id, p.created_at, u.name,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
           (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count
    FROM skill_posts p
    JOIN users u ON u.id = p.author_id";

const COMMENT_SELECT: &str = "
    SELECT c.id, c.content, c.author_id, c.post_id, c.created_at, u.name
    FROM comments c
    JOIN users u ON u.id = c.author_id";

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        post: SkillPost {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            media_url: row.get(3)?,
            author_id: row.get(4)?,
            created_at: row.get(5)?,
        },
        author_name: row.get(6)?,
        comment_count: row.get(7)?,
        like_count: row.get(8)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        comment: Comment {
            id: row.get(0)?,
            content: row.get(1)?,
            author_id: row.get(2)?,
            post_id: row.get(3)?,
            created_at: row.get(4)?,
        },
        author_name: row.get(5)?,
    })
}

fn like_from_row(row: &Row<'_>) -> rusqlite::Result<Like> {
    Ok(Like {
        id: row.get(0)?,
        user_id: row.get(1)?,
        post_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn query_posts(
    conn: &Connection,
    filter: &str,
    param: Option<&str>,
) -> Result<Vec<PostRow>, RepositoryError> {
    let sql = format!(
        "{} {} ORDER BY p.created_at DESC, p.rowid DESC",
        POST_SELECT, filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = match param {
        Some(p) => stmt.query_map(params![p], post_from_row)?,
        None => stmt.query_map([], post_from_row)?,
    };
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn query_comments(
    conn: &Connection,
    filter: &str,
    param: &str,
) -> Result<Vec<CommentRow>, RepositoryError> {
    let sql = format!(
        "{} {} ORDER BY c.created_at DESC, c.rowid DESC",
        COMMENT_SELECT, filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![param], comment_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn query_likes(conn: &Connection, filter: &str, param: &str) -> Result<Vec<Like>, RepositoryError> {
    let sql = format!(
        "SELECT id, user_id, post_id, created_at FROM likes {} ORDER BY created_at DESC, rowid DESC",
        filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![param], like_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[async_trait]
impl ContentRepository for SqliteContentRepository {
    async fn insert_post(&self, post: &SkillPost) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO skill_posts (id, title, content, media_url, author_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                post.id,
                post.title,
                post.content,
                post.media_url,
                post.author_id,
                post.created_at
            ],
        )?;

        Ok(())
    }

    async fn list_posts(&self) -> Result<Vec<PostRow>, RepositoryError> {
        let conn = self.pool.get()?;
        query_posts(&conn, "", None)
    }

    async fn find_post(&self, id: &str) -> Result<Option<PostRow>, RepositoryError> {
        let conn = self.pool.get()?;

        let sql = format!("{} WHERE p.id = ?1", POST_SELECT);
        let post = conn
            .query_row(&sql, params![id], post_from_row)
            .optional()?;

        Ok(post)
    }

    async fn posts_by_author(&self, author_id: &str) -> Result<Vec<PostRow>, RepositoryError> {
        let conn = self.pool.get()?;
        query_posts(&conn, "WHERE p.author_id = ?1", Some(author_id))
    }

    async fn delete_post(&self, id: &str) -> Result<DeletedPost, RepositoryError> {
        let conn = self.pool.get()?;

        in_transaction(&conn, |tx| {
            let comments = tx.execute("DELETE FROM comments WHERE post_id = ?1", params![id])?;
            let likes = tx.execute("DELETE FROM likes WHERE post_id = ?1", params![id])?;
            let posts = tx.execute("DELETE FROM skill_posts WHERE id = ?1", params![id])?;

            if posts == 0 {
                return Err(RepositoryError::NotFound("Post not found.".into()));
            }

            Ok(DeletedPost { comments, likes })
        })
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO comments (id, content, author_id, post_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                comment.id,
                comment.content,
                comment.author_id,
                comment.post_id,
                comment.created_at
            ],
        )?;

        Ok(())
    }

    async fn find_comment(&self, id: &str) -> Result<Option<CommentRow>, RepositoryError> {
        let conn = self.pool.get()?;

        let sql = format!("{} WHERE c.id = ?1", COMMENT_SELECT);
        let comment = conn
            .query_row(&sql, params![id], comment_from_row)
            .optional()?;

        Ok(comment)
    }

    async fn comments_for_post(&self, post_id: &str) -> Result<Vec<CommentRow>, RepositoryError> {
        let conn = self.pool.get()?;
        query_comments(&conn, "WHERE c.post_id = ?1", post_id)
    }

    async fn comments_by_author(
        &self,
        author_id: &str,
    ) -> Result<Vec<CommentRow>, RepositoryError> {
        let conn = self.pool.get()?;
        query_comments(&conn, "WHERE c.author_id = ?1", author_id)
    }

    async fn delete_comment(&self, id: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    async fn toggle_like(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> Result<LikeState, RepositoryError> {
        let conn = self.pool.get()?;

        in_transaction(&conn, |tx| {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM skill_posts WHERE id = ?1)",
                params![post_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(RepositoryError::NotFound("Post not found.".into()));
            }

            let removed = tx.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2",
                params![user_id, post_id],
            )?;

            if removed == 0 {
                tx.execute(
                    "INSERT INTO likes (id, user_id, post_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        uuid::Uuid::now_v7().to_string(),
                        user_id,
                        post_id,
                        now_timestamp()
                    ],
                )?;
            }

            let like_count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
                params![post_id],
                |row| row.get(0),
            )?;

            Ok(LikeState {
                liked: removed == 0,
                like_count,
            })
        })
    }

    async fn likes_for_post(&self, post_id: &str) -> Result<Vec<Like>, RepositoryError> {
        let conn = self.pool.get()?;
        query_likes(&conn, "WHERE post_id = ?1", post_id)
    }

    async fn likes_by_user(&self, user_id: &str) -> Result<Vec<Like>, RepositoryError> {
        let conn = self.pool.get()?;
        query_likes(&conn, "WHERE user_id = ?1", user_id)
    }
}
