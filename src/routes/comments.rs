use axum::extract::{Path, State};
use axum::routing::delete;
use axum::{Json, Router};

use super::posts::MessageResponse;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/comments/{id}", delete(delete_comment))
}

/// DELETE /comments/{id}
async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.content.delete_comment(&user.id, &id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Comment deleted successfully.".into(),
    }))
}
