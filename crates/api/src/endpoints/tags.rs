//! Tags endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use inkwell_common::AppResult;
use inkwell_core::{CreateTagInput, UpdateTagInput};
use inkwell_db::entities::{tag, user::Role};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, require_role},
    middleware::AppState,
    response::{self, ApiResponse},
};

/// Tag response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    pub post_count: i32,
}

impl From<tag::Model> for TagResponse {
    fn from(t: tag::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            post_count: t.post_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListTagsQuery {
    pub limit: Option<u64>,
}

/// Tags, most used first.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListTagsQuery>,
) -> AppResult<ApiResponse<Vec<TagResponse>>> {
    let tags = state.tag_service.list(query.limit).await?;
    Ok(ApiResponse::ok(tags.into_iter().map(Into::into).collect()))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTagInput>,
) -> AppResult<impl IntoResponse> {
    require_role(&user, Role::AdminLevelOne)?;
    let tag = state.tag_service.create(req).await?;
    Ok(ApiResponse::created(TagResponse::from(tag)))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateTagInput>,
) -> AppResult<ApiResponse<TagResponse>> {
    require_role(&user, Role::AdminLevelOne)?;
    let tag = state.tag_service.update(req).await?;
    Ok(ApiResponse::ok(tag.into()))
}

async fn delete_tag(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_role(&user, Role::AdminLevelOne)?;
    state.tag_service.delete(&id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tag", get(list))
        .route("/tag/new", post(create))
        .route("/tag/update", patch(update))
        .route("/tag/delete/{id}", delete(delete_tag))
}
