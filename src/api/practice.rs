//! Practice dialogue endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequestParts, State},
    http::request::Parts,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::audio::AudioStore;
use crate::dialogue::{Effect, Event};
use crate::session::{SessionId, SessionSnapshot};

/// Header carrying the caller's session identifier
pub const SESSION_HEADER: &str = "x-session-id";

/// Build practice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/start", post(start))
        .route("/user-response", post(user_response))
        .route("/help", post(help))
        .route("/retry", post(retry))
        .route("/session", get(session))
        .with_state(state)
}

/// Session selected by the `X-Session-Id` header, or the shared default
#[derive(Debug, Clone)]
pub struct SessionKey(pub SessionId);

impl<S: Send + Sync> FromRequestParts<S> for SessionKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(SESSION_HEADER) else {
            return Ok(Self(SessionId::shared()));
        };

        let raw = value
            .to_str()
            .map_err(|_| ApiError::BadRequest("session id must be printable ASCII".to_string()))?;
        Ok(Self(SessionId::parse(raw)?))
    }
}

/// Spoken prompt returned by every dialogue endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
    pub session_id: SessionId,
    pub audio_url: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_video_url: Option<String>,
}

/// Body of `POST /user-response`
#[derive(Debug, Deserialize)]
pub struct UserResponseRequest {
    pub response: Option<String>,
}

/// Ask whether the user wants to practice
async fn start(
    State(state): State<Arc<ApiState>>,
    SessionKey(id): SessionKey,
) -> Result<Json<PromptResponse>, ApiError> {
    respond(&state, id, Event::Start).await
}

/// Handle a typed or transcribed answer
async fn user_response(
    State(state): State<Arc<ApiState>>,
    SessionKey(id): SessionKey,
    body: Bytes,
) -> Result<Json<PromptResponse>, ApiError> {
    let text = serde_json::from_slice::<UserResponseRequest>(&body)
        .ok()
        .and_then(|r| r.response)
        .ok_or_else(|| ApiError::BadRequest("No response provided".to_string()))?;

    respond(&state, id, Event::UserResponse(text)).await
}

/// Give a hint for the current color
async fn help(
    State(state): State<Arc<ApiState>>,
    SessionKey(id): SessionKey,
) -> Result<Json<PromptResponse>, ApiError> {
    respond(&state, id, Event::HelpRequest).await
}

/// Prompt another attempt at the current color
async fn retry(
    State(state): State<Arc<ApiState>>,
    SessionKey(id): SessionKey,
) -> Result<Json<PromptResponse>, ApiError> {
    respond(&state, id, Event::RetryRequest).await
}

/// Inspect the caller's session without creating it
async fn session(
    State(state): State<Arc<ApiState>>,
    SessionKey(id): SessionKey,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state.sessions.get(&id).ok_or(ApiError::SessionNotFound)?;
    let snapshot = session.lock().await.snapshot();
    Ok(Json(snapshot))
}

/// Apply `event` to the session, then speak the resulting prompt
///
/// The transition is committed before synthesis, so a synthesis failure
/// still advances the dialogue.
async fn respond(
    state: &ApiState,
    id: SessionId,
    event: Event,
) -> Result<Json<PromptResponse>, ApiError> {
    let session = state.sessions.get_or_create(&id)?;
    let outcome = {
        let mut session = session.lock().await;
        session
            .apply(event, state.color_picker.as_ref())
            .inspect_err(|e| tracing::info!(session = %id, error = %e, "transition rejected"))?
    };

    for effect in &outcome.effects {
        match effect {
            Effect::ColorAssigned(color) => {
                tracing::info!(session = %id, color = %color, "color assigned");
            }
            Effect::ShowHint { color, video_url } => {
                tracing::info!(session = %id, color = %color, video = %video_url, "hint shown");
            }
        }
    }

    let audio_url = speak(state, &outcome.prompt).await?;

    Ok(Json(PromptResponse {
        session_id: id,
        audio_url,
        hint_video_url: outcome.hint_video_url().map(ToString::to_string),
        prompt: outcome.prompt,
    }))
}

/// Synthesize `prompt` and store it, returning its public URL
async fn speak(state: &ApiState, prompt: &str) -> Result<String, ApiError> {
    let audio = state.synthesizer.synthesize(prompt).await.map_err(|e| {
        tracing::error!(provider = state.synthesizer.name(), error = %e, "error generating speech");
        ApiError::SynthesisFailed
    })?;

    let file_name = state.audio.save(&audio).await.map_err(|e| {
        tracing::error!(error = %e, "failed to store generated audio");
        ApiError::SynthesisFailed
    })?;

    Ok(AudioStore::url_for(&file_name))
}
