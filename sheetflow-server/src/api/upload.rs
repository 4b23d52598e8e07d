//! Upload API Handler
//!
//! Accepts the two spreadsheet files as a multipart form and adopts
//! them as the live path state.

use std::path::Path;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
};
use serde::Serialize;
use tracing::{error, info};

use crate::api::error::{ApiError, ApiResult};
use crate::config;
use crate::state::AppState;

/// Response body for a successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub base_sheet: String,
    pub new_data_sheet: String,
}

/// POST /upload
/// Accepts `baseSheet` and `newDataSheet` multipart file parts
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut base: Option<(String, Bytes)> = None;
    let mut new_data: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart request: {e}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read '{name}': {e}")))?;

        match name.as_str() {
            "baseSheet" => base = Some((file_name, bytes)),
            "newDataSheet" => new_data = Some((file_name, bytes)),
            _ => {}
        }
    }

    let (Some((base_name, base_bytes)), Some((new_name, new_bytes))) = (base, new_data) else {
        return Err(ApiError::BadRequest("Both files are required".to_string()));
    };

    if base_name.is_empty() || new_name.is_empty() {
        return Err(ApiError::BadRequest("No selected files".to_string()));
    }

    if !config::allowed_file(&base_name) || !config::allowed_file(&new_name) {
        return Err(ApiError::BadRequest(
            "Invalid file type. Only Excel files (.xlsx, .xls) are allowed".to_string(),
        ));
    }

    let base_filename = sanitize_filename(&base_name);
    let new_data_filename = sanitize_filename(&new_name);

    let base_path = state.config.upload_dir.join(&base_filename);
    let new_data_path = state.config.upload_dir.join(&new_data_filename);

    // The safety copy of a previously uploaded base file must capture
    // its pre-upload bytes, so paths (and the backup they trigger) are
    // updated before the new contents land on disk.
    state
        .paths
        .update_file_paths(&base_path, &new_data_path)
        .map_err(|e| {
            error!("Error uploading files: {e}");
            ApiError::from(e)
        })?;

    save_upload(&base_path, &base_bytes).await?;
    save_upload(&new_data_path, &new_bytes).await?;

    info!("Uploaded base sheet '{base_filename}' and new data sheet '{new_data_filename}'");

    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        base_sheet: base_filename,
        new_data_sheet: new_data_filename,
    }))
}

async fn save_upload(path: &Path, bytes: &Bytes) -> ApiResult<()> {
    tokio::fs::write(path, bytes).await.map_err(|e| {
        error!("Failed to save upload {}: {e}", path.display());
        ApiError::InternalError(format!("Failed to save uploaded file: {e}"))
    })
}

/// Reduces an uploaded filename to a safe flat name
///
/// Path components are stripped and anything outside
/// `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
