//! API endpoints.

mod auth;
mod comments;
mod posts;
mod quotes;
mod reactions;
mod tags;
mod upload;
mod users;

use axum::Router;

use crate::middleware::AppState;

pub use auth::AuthResponse;
pub use comments::CommentResponse;
pub use posts::{PostDetailResponse, PostResponse};
pub use tags::TagResponse;
pub use users::UserResponse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(posts::router())
        .merge(reactions::router())
        .merge(comments::router())
        .merge(tags::router())
        .merge(quotes::router())
        .merge(upload::router())
}
