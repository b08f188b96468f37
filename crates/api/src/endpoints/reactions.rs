//! Post reaction endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use inkwell_common::AppResult;

use super::posts::{PostResponse, posts};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Toggle a like. Returns whether the post is liked afterwards.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<bool>> {
    let liked = state.reaction_service.toggle_like(&post_id, &user.id).await?;
    Ok(ApiResponse::ok(liked))
}

/// Toggle a dislike. Returns whether the post is disliked afterwards.
async fn dislike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<bool>> {
    let disliked = state
        .reaction_service
        .toggle_dislike(&post_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(disliked))
}

/// Toggle a favorite. Returns whether the post is a favorite afterwards.
async fn favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<bool>> {
    let favorited = state
        .reaction_service
        .toggle_favorite(&post_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(favorited))
}

async fn liked(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    Ok(posts(state.reaction_service.liked_posts(&user.id).await?))
}

async fn favorites(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    Ok(posts(state.reaction_service.favorite_posts(&user.id).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/post/post-reaction/like/{post_id}", post(like))
        .route("/post/post-reaction/dislike/{post_id}", post(dislike))
        .route("/post/post-reaction/favorite/{post_id}", post(favorite))
        .route("/post/post-reaction/liked", get(liked))
        .route("/post/post-reaction/favorites", get(favorites))
}
