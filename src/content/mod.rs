//! Skill posts, comments and likes.
//!
//! `ContentService` owns the rules (validation, authorship, sanitization);
//! all persistence goes through a [`ContentRepository`].

mod comments;
mod likes;
mod posts;
pub mod sanitize;
pub mod views;

use crate::db::models::User;
use crate::error::AppResult;
use crate::repository::content::{ContentRepository, DynContentRepository};

pub use crate::repository::content::{DeletedPost, LikeState};
pub use views::{AuthorRef, CommentView, PostDetail, PostSummary, PublicUser, UserWithRelations};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_CONTENT_BYTES: usize = 20_000;
pub const MAX_COMMENT_LENGTH: usize = 1_000;

pub struct ContentService {
    repo: DynContentRepository,
}

impl ContentService {
    pub fn new(repo: DynContentRepository) -> Self {
        Self { repo }
    }
}

/// Load everything a user has authored or liked.
pub async fn user_relations(
    repo: &dyn ContentRepository,
    user: &User,
) -> AppResult<UserWithRelations> {
    let posts = repo.posts_by_author(&user.id).await?;
    let comments = repo.comments_by_author(&user.id).await?;
    let likes = repo.likes_by_user(&user.id).await?;

    Ok(UserWithRelations {
        user: PublicUser::from(user),
        posts: posts.into_iter().map(PostSummary::from).collect(),
        comments: comments.into_iter().map(CommentView::from).collect(),
        likes,
    })
}

fn require_id<'a>(value: &'a str, what: &str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(crate::error::AppError::BadRequest(format!(
            "{} is required",
            what
        )));
    }
    Ok(value)
}
