//! Download API Handler
//!
//! Serves finished output artifacts as attachments.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /download/{filename}
/// Serves a file from the output directory as an attachment
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !is_safe_name(&filename) {
        return Err(ApiError::BadRequest("Invalid file name".to_string()));
    }

    let path = state.config.output_dir.join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound(format!("File '{filename}' not found")))?;

    debug!("serving download {}", path.display());

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes))
}

/// Rejects names that could escape the output directory
fn is_safe_name(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}
