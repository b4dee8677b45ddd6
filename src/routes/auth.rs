use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::content::{PublicUser, UserWithRelations};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, JsonBody};
use crate::state::AppState;

// -- Request/Response types --

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct SigninResponse {
    pub success: bool,
    pub message: String,
    pub user: UserWithRelations,
    pub token: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserWithRelations,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/me", get(me))
}

// -- Handlers --

/// POST /auth/signup
async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let outcome = state
        .auth
        .signup(&req.name, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: "User created successfully".into(),
            user: outcome.user,
            token: outcome.token,
        }),
    ))
}

/// POST /auth/signin
async fn signin(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SigninRequest>,
) -> AppResult<Json<SigninResponse>> {
    let outcome = state.auth.signin(&req.email, &req.password).await?;

    Ok(Json(SigninResponse {
        success: true,
        message: "Signed in successfully".into(),
        user: outcome.user,
        token: outcome.token,
    }))
}

/// GET /auth/me
async fn me(State(state): State<AppState>, user: CurrentUser) -> AppResult<Json<MeResponse>> {
    let user = state.auth.me(&user.id).await?;
    Ok(Json(MeResponse {
        success: true,
        user,
    }))
}
