//! Shared test utilities

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use sign_coach::config::LifecycleConfig;
use sign_coach::dialogue::{Color, FixedColor};
use sign_coach::{ApiServerBuilder, ApiState, Error, Result, Synthesizer, Transcriber};
use tempfile::TempDir;
use tower::ServiceExt;

/// Bytes every fake synthesis returns
pub const FAKE_MP3: &[u8] = b"ID3\x04\x00fake-mp3-frames";

/// Multipart boundary used by [`multipart_body`]
pub const BOUNDARY: &str = "sign-coach-test-boundary";

/// Synthesizer that returns fixed bytes, or always fails
#[derive(Default)]
pub struct FakeSynthesizer {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeSynthesizer {
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for FakeSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Synthesis("provider unavailable".to_string()));
        }
        Ok(FAKE_MP3.to_vec())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Transcriber that returns a canned transcript, or always fails
pub struct FakeTranscriber {
    transcript: Option<String>,
    calls: AtomicUsize,
}

impl FakeTranscriber {
    #[must_use]
    pub fn returning(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            transcript: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, audio: &[u8], _file_name: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!audio.is_empty(), "transcriber received empty audio");
        self.transcript
            .clone()
            .ok_or_else(|| Error::Transcription("provider unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// A router wired to fakes, plus the directories it writes to
pub struct TestApp {
    pub router: Router,
    pub state: Arc<ApiState>,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub transcriber: Arc<FakeTranscriber>,
    pub audio_dir: TempDir,
    pub upload_dir: TempDir,
}

impl TestApp {
    /// App that always assigns `Color::Green` and synthesizes successfully
    pub fn new() -> Self {
        Self::with(
            FakeSynthesizer::default(),
            FakeTranscriber::returning("Yes"),
        )
    }

    pub fn with(synthesizer: FakeSynthesizer, transcriber: FakeTranscriber) -> Self {
        Self::configured(synthesizer, transcriber, |builder| builder)
    }

    /// App whose session registry admits at most `max_sessions`
    pub fn with_max_sessions(max_sessions: u64) -> Self {
        Self::configured(
            FakeSynthesizer::default(),
            FakeTranscriber::returning("Yes"),
            |builder| {
                builder.lifecycle(LifecycleConfig {
                    max_sessions,
                    ..LifecycleConfig::default()
                })
            },
        )
    }

    /// App that rejects request bodies over `bytes`
    pub fn with_upload_limit(bytes: usize) -> Self {
        Self::configured(
            FakeSynthesizer::default(),
            FakeTranscriber::returning("Yes"),
            |builder| builder.max_upload_bytes(bytes),
        )
    }

    fn configured(
        synthesizer: FakeSynthesizer,
        transcriber: FakeTranscriber,
        customize: impl FnOnce(ApiServerBuilder) -> ApiServerBuilder,
    ) -> Self {
        let audio_dir = TempDir::new().expect("audio dir");
        let upload_dir = TempDir::new().expect("upload dir");
        let synthesizer = Arc::new(synthesizer);
        let transcriber = Arc::new(transcriber);

        let builder = ApiServerBuilder::new(synthesizer.clone(), transcriber.clone())
            .audio_dir(audio_dir.path().to_path_buf())
            .upload_dir(upload_dir.path().to_path_buf())
            .color_picker(Arc::new(FixedColor(Color::Green)));
        let server = customize(builder).build();

        Self {
            router: server.router(),
            state: server.state(),
            synthesizer,
            transcriber,
            audio_dir,
            upload_dir,
        }
    }

    /// Send a request and return status plus JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        json_body(response).await
    }

    /// `POST path` with an optional JSON body and session header
    pub async fn post(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
        session: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method("POST").uri(path);
        if let Some(id) = session {
            builder = builder.header("x-session-id", id);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, path: &str, session: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(id) = session {
            builder = builder.header("x-session-id", id);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

/// Split a response into status and parsed JSON body
pub async fn json_body(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Build a multipart body with one file field
pub fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/webm\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Build a multipart body with one plain form value (no filename)
pub fn multipart_text_body(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes()
}

/// Multipart `POST /transcribe-audio` request
pub fn transcribe_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/transcribe-audio")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Number of entries in a directory
pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map_or(0, Iterator::count)
}
