//! Quotes endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use inkwell_common::AppResult;
use inkwell_core::{CreateQuoteInput, UpdateQuoteInput};
use inkwell_db::entities::{quote, user::Role};

use crate::{
    extractors::{AuthUser, require_role},
    middleware::AppState,
    response::{self, ApiResponse},
};

async fn random(State(state): State<AppState>) -> AppResult<ApiResponse<quote::Model>> {
    Ok(ApiResponse::ok(state.quote_service.random().await?))
}

async fn all(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<quote::Model>>> {
    Ok(ApiResponse::ok(state.quote_service.list().await?))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateQuoteInput>,
) -> AppResult<impl IntoResponse> {
    require_role(&user, Role::AdminLevelOne)?;
    let quote = state.quote_service.create(req).await?;
    Ok(ApiResponse::created(quote))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateQuoteInput>,
) -> AppResult<ApiResponse<quote::Model>> {
    require_role(&user, Role::AdminLevelOne)?;
    Ok(ApiResponse::ok(state.quote_service.update(&id, req).await?))
}

async fn delete_quote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_role(&user, Role::AdminLevelOne)?;
    state.quote_service.delete(&id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote/random-quote", get(random))
        .route("/quote/all-quotes", get(all))
        .route("/quote/new-quote", post(create))
        .route("/quote/update-quote/{id}", patch(update))
        .route("/quote/delete-quote/{id}", delete(delete_quote))
}
