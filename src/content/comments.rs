use super::sanitize::plain_text;
use super::views::CommentView;
use super::{require_id, ContentService, MAX_COMMENT_LENGTH};
use crate::db::models::Comment;
use crate::error::{AppError, AppResult};
use crate::repository::now_timestamp;

impl ContentService {
    /// Comments are stored as plain text; any markup is stripped.
    pub async fn create_comment(
        &self,
        user_id: &str,
        post_id: &str,
        content: &str,
    ) -> AppResult<CommentView> {
        let post_id = require_id(post_id, "Post id")?;
        let content = plain_text(content).trim().to_string();
        if content.is_empty() {
            return Err(AppError::BadRequest("Comment cannot be empty".into()));
        }
        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::BadRequest(
                "Comment must be 1000 characters or less".into(),
            ));
        }

        if self.repo.find_post(post_id).await?.is_none() {
            return Err(AppError::NotFound("Post not found.".into()));
        }

        let comment = Comment {
            id: uuid::Uuid::now_v7().to_string(),
            content,
            author_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: now_timestamp(),
        };
        self.repo.insert_comment(&comment).await?;

        let row = self
            .repo
            .find_comment(&comment.id)
            .await?
            .ok_or_else(|| AppError::Internal("Created comment vanished".into()))?;
        Ok(CommentView::from(row))
    }

    pub async fn delete_comment(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        let comment_id = require_id(comment_id, "Comment id")?;

        let row = self
            .repo
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found.".into()))?;

        if row.comment.author_id != user_id {
            return Err(AppError::Forbidden(
                "You are not authorized to delete this comment.".into(),
            ));
        }

        self.repo.delete_comment(comment_id).await?;
        Ok(())
    }
}
