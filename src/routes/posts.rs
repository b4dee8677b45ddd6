use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::content::{CommentView, PostDetail, PostSummary};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, JsonBody, MaybeUser};
use crate::state::AppState;

// -- Request/Response types --

#[derive(Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "mediaUrl")]
    pub media_url: Option<String>,
}

#[derive(Serialize)]
pub struct CreatePostResponse {
    pub success: bool,
    pub message: String,
    pub post: PostSummary,
}

#[derive(Serialize)]
pub struct PostListResponse {
    pub success: bool,
    pub posts: Vec<PostSummary>,
}

#[derive(Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub post: PostDetail,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize)]
pub struct CreateCommentResponse {
    pub success: bool,
    pub message: String,
    pub comment: CommentView,
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub success: bool,
    pub liked: bool,
    pub like_count: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route("/posts/{id}/comments", post(create_comment))
        .route("/posts/{id}/likes", post(toggle_like))
}

// -- Handlers --

/// POST /posts
async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(req): JsonBody<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<CreatePostResponse>)> {
    let post = state
        .content
        .create_post(&user.id, &req.title, &req.content, req.media_url.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            success: true,
            message: "Post created successfully".into(),
            post,
        }),
    ))
}

/// GET /posts
async fn list_posts(State(state): State<AppState>) -> AppResult<Json<PostListResponse>> {
    let posts = state.content.list_posts().await?;
    Ok(Json(PostListResponse {
        success: true,
        posts,
    }))
}

/// GET /posts/{id}
async fn get_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> AppResult<Json<PostResponse>> {
    let viewer = user.as_ref().map(|u| u.id.as_str());
    let post = state.content.get_post(&id, viewer).await?;
    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

/// DELETE /posts/{id}
async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.content.delete_post(&id, &user.id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Post deleted successfully.".into(),
    }))
}

/// POST /posts/{id}/comments
async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CreateCommentResponse>)> {
    let comment = state
        .content
        .create_comment(&user.id, &id, &req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCommentResponse {
            success: true,
            message: "Comment added".into(),
            comment,
        }),
    ))
}

/// POST /posts/{id}/likes
async fn toggle_like(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<LikeResponse>> {
    let like = state.content.toggle_like(&user.id, &id).await?;
    Ok(Json(LikeResponse {
        success: true,
        liked: like.liked,
        like_count: like.like_count,
    }))
}
