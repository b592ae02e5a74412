//! Speech-to-text endpoint for spoken answers

use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use super::{ApiError, ApiState};
use crate::dialogue::normalize;

/// Multipart field holding the recording
const FILE_FIELD: &str = "file";

/// Build transcription router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/transcribe-audio", post(transcribe_audio))
        .with_state(state)
}

/// Transcription response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeResponse {
    pub transcribed_text: String,
}

/// A recording spooled to disk; the file is deleted when this is dropped
struct Upload {
    path: TempPath,
    file_name: String,
}

/// Transcribe an uploaded recording
///
/// The upload is spooled to a temporary file that is removed whether or not
/// transcription succeeds.
async fn transcribe_audio(
    State(state): State<Arc<ApiState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "request is not multipart");
        ApiError::BadRequest("No audio file uploaded".to_string())
    })?;

    let upload = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&e))?
            .ok_or_else(|| ApiError::BadRequest("No audio file uploaded".to_string()))?;

        // Only a file part counts; a plain form value named `file` does not
        if field.name() == Some(FILE_FIELD) && field.file_name().is_some() {
            break spool(&state.upload_dir, field).await?;
        }
    };

    let audio = tokio::fs::read(&upload.path).await.map_err(|e| {
        tracing::error!(path = %upload.path.display(), error = %e, "failed to read upload");
        ApiError::Internal
    })?;

    if audio.is_empty() {
        return Err(ApiError::BadRequest("Uploaded audio file is empty".to_string()));
    }

    let text = state
        .transcriber
        .transcribe(&audio, &upload.file_name)
        .await
        .map_err(|e| {
            tracing::error!(provider = state.transcriber.name(), error = %e, "error transcribing audio");
            ApiError::TranscriptionFailed
        })?;

    let transcribed_text = normalize(&text);
    tracing::info!(transcript = %transcribed_text, "transcribed text");

    Ok(Json(TranscribeResponse { transcribed_text }))
}

/// Stream a multipart field into a temporary file inside `dir`
async fn spool(dir: &Path, mut field: Field<'_>) -> Result<Upload, ApiError> {
    let file_name = field
        .file_name()
        .filter(|n| !n.is_empty())
        .map_or_else(|| "audio.mp3".to_string(), ToString::to_string);
    let suffix = Path::new(&file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map_or_else(|| ".mp3".to_string(), |e| format!(".{e}"));

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        tracing::error!(dir = %dir.display(), error = %e, "failed to create upload dir");
        ApiError::Internal
    })?;

    let temp_dir = dir.to_path_buf();
    let temp = tokio::task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix("temp_")
            .suffix(&suffix)
            .tempfile_in(&temp_dir)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "upload file task failed");
        ApiError::Internal
    })?
    .map_err(|e| {
        tracing::error!(dir = %dir.display(), error = %e, "failed to create upload file");
        ApiError::Internal
    })?;

    let (file, path) = temp.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        file.write_all(&chunk).await.map_err(|e| {
            tracing::error!(error = %e, "failed to write upload");
            ApiError::Internal
        })?;
    }
    file.flush().await.map_err(|_| ApiError::Internal)?;

    tracing::debug!(path = %path.display(), file_name = %file_name, "upload spooled");
    Ok(Upload { path, file_name })
}

/// Map a multipart read failure, keeping 413 for oversized bodies
fn multipart_error(e: &MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::info!(error = %e, "upload exceeds body limit");
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(format!("failed to read upload: {}", e.body_text()))
    }
}
