//! HTTP API layer for inkwell.
//!
//! - **Endpoints**: auth, users, posts, reactions, comments, tags, quotes, uploads
//! - **Extractors**: authenticated user and role checks
//! - **Middleware**: bearer token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
