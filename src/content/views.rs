// Response shapes returned by the services
use serde::Serialize;

use super::sanitize::excerpt;
use crate::db::models::{CommentRow, Like, PostRow, User};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthorRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub media_url: Option<String>,
    pub author: AuthorRef,
    pub created_at: String,
    pub comment_count: i64,
    pub like_count: i64,
}

impl From<PostRow> for PostSummary {
    fn from(row: PostRow) -> Self {
        let post = row.post;
        Self {
            excerpt: excerpt(&post.content),
            id: post.id,
            title: post.title,
            content: post.content,
            media_url: post.media_url,
            author: AuthorRef {
                id: post.author_id,
                name: row.author_name,
            },
            created_at: post.created_at,
            comment_count: row.comment_count,
            like_count: row.like_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub post_id: String,
    pub author: AuthorRef,
    pub created_at: String,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        let comment = row.comment;
        Self {
            author: AuthorRef {
                id: comment.author_id.clone(),
                name: row.author_name,
            },
            id: comment.id,
            content: comment.content,
            author_id: comment.author_id,
            post_id: comment.post_id,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub id: String,
    pub title: String,
    pub content: String,
    pub media_url: Option<String>,
    pub author_id: String,
    pub author: AuthorRef,
    pub created_at: String,
    /// Newest first.
    pub comments: Vec<CommentView>,
    pub likes: Vec<Like>,
    pub like_count: i64,
    pub liked_by_me: bool,
}

/// A user together with everything they authored, as returned by signin.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRelations {
    #[serde(flatten)]
    pub user: PublicUser,
    pub posts: Vec<PostSummary>,
    pub comments: Vec<CommentView>,
    pub likes: Vec<Like>,
}
