//! File upload endpoint.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::post,
};
use inkwell_common::{AppError, AppResult};
use inkwell_core::UploadedFile;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Largest accepted upload body.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Upload the multipart field `file` into `<folder>/<sub_folder>`.
async fn upload(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((folder, sub_folder)): Path<(String, String)>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<UploadedFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let file = state
            .upload_service
            .upload(&folder, &sub_folder, &original_name, &content_type, &data)
            .await?;

        tracing::debug!(user_id = %user.id, path = %file.path, "Accepted upload");
        return Ok(ApiResponse::ok(file));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload/{folder}/{sub_folder}", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
