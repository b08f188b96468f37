//! Comments endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use inkwell_common::AppResult;
use inkwell_core::{CreateCommentInput, UpdateCommentInput};
use inkwell_db::entities::comment;
use serde::Serialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub post_id: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            content: c.content,
            author_id: c.author_id,
            post_id: c.post_id,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

fn comments(models: Vec<comment::Model>) -> ApiResponse<Vec<CommentResponse>> {
    ApiResponse::ok(models.into_iter().map(Into::into).collect())
}

async fn by_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    Ok(comments(state.comment_service.by_post(&post_id).await?))
}

async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.get(&id).await?;
    Ok(ApiResponse::ok(comment.into()))
}

async fn current_user_comments(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    Ok(comments(state.comment_service.by_author(&user.id).await?))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentInput>,
) -> AppResult<impl IntoResponse> {
    let comment = state.comment_service.create(&user.id, req).await?;
    Ok(ApiResponse::created(CommentResponse::from(comment)))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.update(&user, req).await?;
    Ok(ApiResponse::ok(comment.into()))
}

async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.comment_service.delete(&id, &user).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/comment/post/{id}", get(by_post))
        .route("/comment/by-id/{id}", get(by_id))
        .route(
            "/comment/get-current-user-comments",
            get(current_user_comments),
        )
        .route("/comment/new", post(create))
        .route("/comment/update", put(update))
        .route("/comment/delete/{id}", delete(delete_comment))
}
