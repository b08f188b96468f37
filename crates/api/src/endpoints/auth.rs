//! Authentication endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use inkwell_common::AppResult;
use inkwell_core::{AuthSession, LoginInput, RegisterInput, TokenPair};
use serde::{Deserialize, Serialize};

use super::users::UserResponse;
use crate::{middleware::AppState, response::ApiResponse};

/// Tokens plus the signed-in user.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub tokens: TokenPair,
    pub user: UserResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            tokens: session.tokens,
            user: session.user.into(),
        }
    }
}

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<(StatusCode, ApiResponse<AuthResponse>)> {
    let session = state.auth_service.register(req).await?;
    Ok(ApiResponse::created(session.into()))
}

/// Sign in to an existing account.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = state.auth_service.login(req).await?;
    Ok(ApiResponse::ok(session.into()))
}

/// Refresh token request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Exchange a refresh token for a new pair.
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(ApiResponse::ok(session.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh))
}
