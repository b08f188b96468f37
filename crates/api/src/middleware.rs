//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use inkwell_core::{
    AuthService, CommentService, PostService, QuoteService, ReactionService, TagService,
    UploadService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub post_service: PostService,
    pub reaction_service: ReactionService,
    pub comment_service: CommentService,
    pub tag_service: TagService,
    pub quote_service: QuoteService,
    pub upload_service: UploadService,
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <access token>` and stores the user in the
/// request extensions. Requests without a valid token pass through
/// anonymously; handlers that need a user reject them via `AuthUser`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .map(ToString::to_string);

    if let Some(token) = token {
        match state.auth_service.authenticate(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid bearer token");
            }
        }
    }

    next.run(req).await
}
