use super::{require_id, ContentService, LikeState};
use crate::error::AppResult;

impl ContentService {
    /// The post-exists check runs inside the toggle's transaction.
    pub async fn toggle_like(&self, user_id: &str, post_id: &str) -> AppResult<LikeState> {
        let post_id = require_id(post_id, "Post id")?;
        Ok(self.repo.toggle_like(user_id, post_id).await?)
    }
}
