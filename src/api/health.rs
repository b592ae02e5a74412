//! Health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Serialize)]
pub struct ReadinessChecks {
    pub audio_dir: CheckResult,
    pub upload_dir: CheckResult,
}

/// Result of a single health check
#[derive(Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    const fn ok() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            status: "fail",
            message: Some(message.into()),
        }
    }
}

/// Build health router
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Build readiness router
pub fn ready_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(state)
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe - can generated audio and uploads be written?
async fn ready(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let audio_dir = check_dir(state.audio.dir()).await;
    let upload_dir = check_dir(&state.upload_dir).await;

    let all_ok = audio_dir.status == "ok" && upload_dir.status == "ok";
    let (status, http_status) = if all_ok {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        http_status,
        Json(ReadinessResponse {
            status,
            checks: ReadinessChecks {
                audio_dir,
                upload_dir,
            },
        }),
    )
}

/// Check a directory exists (creating it if needed) and is a directory
async fn check_dir(dir: &std::path::Path) -> CheckResult {
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        return CheckResult::fail(format!("cannot create {}: {e}", dir.display()));
    }
    match tokio::fs::metadata(dir).await {
        Ok(m) if m.is_dir() => CheckResult::ok(),
        Ok(_) => CheckResult::fail(format!("{} is not a directory", dir.display())),
        Err(e) => CheckResult::fail(format!("cannot stat {}: {e}", dir.display())),
    }
}
