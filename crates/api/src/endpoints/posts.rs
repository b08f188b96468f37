//! Posts endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use inkwell_common::AppResult;
use inkwell_core::{CreatePostInput, PostQuery, ReactionCounts, UpdatePostInput};
use inkwell_db::entities::post;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub cover: String,
    pub tag_id: Option<String>,
    pub author_id: String,
    pub view_count: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            title: p.title,
            content: p.content,
            cover: p.cover,
            tag_id: p.tag_id,
            author_id: p.author_id,
            view_count: p.view_count,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// A single post with its reaction totals.
#[derive(Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub reactions: ReactionCounts,
}

pub(super) fn posts(models: Vec<post::Model>) -> ApiResponse<Vec<PostResponse>> {
    ApiResponse::ok(models.into_iter().map(Into::into).collect())
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    Ok(posts(state.post_service.list(query).await?))
}

async fn by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<PostQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let query = PostQuery {
        tag: Some(tag),
        ..query
    };
    Ok(posts(state.post_service.list(query).await?))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

async fn most_viewed(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    Ok(posts(state.post_service.most_viewed(query.limit).await?))
}

/// Get a post. Counts as a view.
async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostDetailResponse>> {
    let post = state.post_service.get(&id).await?;
    let reactions = state.reaction_service.counts(&id).await?;

    Ok(ApiResponse::ok(PostDetailResponse {
        post: post.into(),
        reactions,
    }))
}

async fn by_author(
    State(state): State<AppState>,
    Path(author_id): Path<String>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    Ok(posts(state.post_service.by_author(&author_id).await?))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostInput>,
) -> AppResult<impl IntoResponse> {
    let post = state.post_service.create(&user.id, req).await?;
    Ok(ApiResponse::created(PostResponse::from(post)))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.update(&user, req).await?;
    Ok(ApiResponse::ok(post.into()))
}

async fn delete_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.post_service.delete(&id, &user).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/post", get(list))
        .route("/post/by-tag/{tag}", get(by_tag))
        .route("/post/most-viewed", get(most_viewed))
        .route("/post/by-id/{id}", get(by_id))
        .route("/post/by-author/{id}", get(by_author))
        .route("/post/new", post(create))
        .route("/post/update", put(update))
        .route("/post/delete/{id}", delete(delete_post))
}
