//! Upload service.
//!
//! Files land under `<folder>/<sub_folder>/` with a random name that keeps
//! the original extension and appends the MIME subtype.

use std::{path::Path, sync::Arc};

use inkwell_common::{AppError, AppResult, IdGenerator, StorageBackend};
use serde::Serialize;

/// Metadata returned for an uploaded file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub original_name: String,
    pub filename: String,
    /// Storage key, relative to the uploads root.
    pub path: String,
    pub size: u64,
    pub mimetype: String,
    pub url: String,
}

/// Upload service for business logic.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl UploadService {
    /// Create a new upload service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Store an uploaded file.
    pub async fn upload(
        &self,
        folder: &str,
        sub_folder: &str,
        original_name: &str,
        mimetype: &str,
        data: &[u8],
    ) -> AppResult<UploadedFile> {
        validate_segment(folder)?;
        validate_segment(sub_folder)?;

        let filename = format!(
            "{}{}.{}",
            self.id_gen.generate_token(),
            extension_of(original_name),
            mime_subtype(mimetype)
        );
        let key = format!("{folder}/{sub_folder}/{filename}");

        let stored = self.storage.put(&key, data).await?;

        tracing::info!(key = %stored.key, size = stored.size, "Uploaded file");

        Ok(UploadedFile {
            original_name: original_name.to_string(),
            filename,
            path: stored.key,
            size: stored.size,
            mimetype: mimetype.to_string(),
            url: stored.url,
        })
    }
}

fn validate_segment(segment: &str) -> AppResult<()> {
    let valid = !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid upload folder: {segment}"
        )))
    }
}

/// Original extension including the dot, or empty.
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn mime_subtype(mimetype: &str) -> String {
    let subtype: String = mimetype
        .split_once('/')
        .map(|(_, sub)| sub.split(';').next().unwrap_or_default().trim())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
        .collect();

    if subtype.is_empty() {
        "bin".to_string()
    } else {
        subtype
    }
}
