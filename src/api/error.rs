//! HTTP error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Error;

/// Errors surfaced to HTTP clients
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request input
    BadRequest(String),
    /// Help or retry without an active color
    NoActiveColor,
    /// No live session for the requested id
    SessionNotFound,
    /// Upload exceeds the request body limit
    PayloadTooLarge,
    /// The session registry is full
    SessionLimit,
    /// Speech could not be generated or stored
    SynthesisFailed,
    /// Uploaded speech could not be transcribed
    TranscriptionFailed,
    /// Anything else; details are logged, not returned
    Internal,
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(msg) => Self::BadRequest(msg),
            Error::NoActiveColor => Self::NoActiveColor,
            Error::SessionLimit(_) => Self::SessionLimit,
            Error::Synthesis(_) | Error::AudioStore(_) => Self::SynthesisFailed,
            Error::Transcription(_) => Self::TranscriptionFailed,
            other => {
                tracing::error!(error = %other, "unhandled error in request");
                Self::Internal
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            Self::NoActiveColor => (
                StatusCode::BAD_REQUEST,
                "no_active_color",
                "No color is currently being practiced".to_string(),
            ),
            Self::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "session_not_found",
                "Session not found".to_string(),
            ),
            Self::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "Uploaded audio file is too large".to_string(),
            ),
            Self::SessionLimit => (
                StatusCode::SERVICE_UNAVAILABLE,
                "session_limit",
                "Too many active sessions, try again later".to_string(),
            ),
            Self::SynthesisFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "synthesis_failed",
                "Failed to generate audio".to_string(),
            ),
            Self::TranscriptionFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "transcription_failed",
                "Failed to transcribe audio".to_string(),
            ),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
        };

        (status, Json(ErrorResponse { error, code })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            ApiError::from(Error::Validation("x".into())),
            ApiError::BadRequest(m) if m == "x"
        ));
        assert!(matches!(
            ApiError::from(Error::NoActiveColor),
            ApiError::NoActiveColor
        ));
        assert!(matches!(
            ApiError::from(Error::SessionLimit(10)),
            ApiError::SessionLimit
        ));
        assert!(matches!(
            ApiError::from(Error::AudioStore("disk full".into())),
            ApiError::SynthesisFailed
        ));
        assert!(matches!(
            ApiError::from(Error::Transcription("boom".into())),
            ApiError::TranscriptionFailed
        ));
        assert!(matches!(
            ApiError::from(Error::Config("x".into())),
            ApiError::Internal
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NoActiveColor.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::SynthesisFailed.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::SessionLimit.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::PayloadTooLarge.into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::SessionNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
