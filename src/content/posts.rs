use super::sanitize::{normalize_media_url, plain_text, sanitize_html};
use super::views::{AuthorRef, CommentView, PostDetail, PostSummary};
use super::{require_id, ContentService, DeletedPost, MAX_CONTENT_BYTES, MAX_TITLE_LENGTH};
use crate::db::models::SkillPost;
use crate::error::{AppError, AppResult};
use crate::repository::now_timestamp;

impl ContentService {
    pub async fn create_post(
        &self,
        author_id: &str,
        title: &str,
        content: &str,
        media_url: Option<&str>,
    ) -> AppResult<PostSummary> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title is required".into()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(AppError::BadRequest(
                "Title must be 200 characters or less".into(),
            ));
        }
        if content.len() > MAX_CONTENT_BYTES {
            return Err(AppError::BadRequest("Content is too long".into()));
        }
        let content = sanitize_html(content.trim());
        if plain_text(&content).trim().is_empty() {
            return Err(AppError::BadRequest("Content is required".into()));
        }
        let media_url = normalize_media_url(media_url)?;

        let post = SkillPost {
            id: uuid::Uuid::now_v7().to_string(),
            title: title.to_string(),
            content,
            media_url,
            author_id: author_id.to_string(),
            created_at: now_timestamp(),
        };
        self.repo.insert_post(&post).await?;
        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");

        let row = self
            .repo
            .find_post(&post.id)
            .await?
            .ok_or_else(|| AppError::Internal("Created post vanished".into()))?;
        Ok(PostSummary::from(row))
    }

    pub async fn list_posts(&self) -> AppResult<Vec<PostSummary>> {
        let rows = self.repo.list_posts().await?;
        Ok(rows.into_iter().map(PostSummary::from).collect())
    }

    /// A post with its comments (newest first) and likes. `viewer` is the
    /// caller's user id when they presented a valid token.
    pub async fn get_post(&self, id: &str, viewer: Option<&str>) -> AppResult<PostDetail> {
        let id = require_id(id, "Post id")?;

        let row = self
            .repo
            .find_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found.".into()))?;
        let comments = self.repo.comments_for_post(id).await?;
        let likes = self.repo.likes_for_post(id).await?;

        let liked_by_me = viewer
            .map(|uid| likes.iter().any(|l| l.user_id == uid))
            .unwrap_or(false);
        let post = row.post;

        Ok(PostDetail {
            author: AuthorRef {
                id: post.author_id.clone(),
                name: row.author_name,
            },
            id: post.id,
            title: post.title,
            content: post.content,
            media_url: post.media_url,
            author_id: post.author_id,
            created_at: post.created_at,
            comments: comments.into_iter().map(CommentView::from).collect(),
            like_count: likes.len() as i64,
            likes,
            liked_by_me,
        })
    }

    /// Only the author may delete. Comments and likes go with the post.
    pub async fn delete_post(&self, post_id: &str, user_id: &str) -> AppResult<DeletedPost> {
        let post_id = require_id(post_id, "Post id")?;

        let row = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found.".into()))?;

        if row.post.author_id != user_id {
            return Err(AppError::Forbidden(
                "You are not authorized to delete this post.".into(),
            ));
        }

        let deleted = self.repo.delete_post(post_id).await?;
        tracing::info!(
            post_id = %post_id,
            comments = deleted.comments,
            likes = deleted.likes,
            "Post deleted"
        );
        Ok(deleted)
    }
}
