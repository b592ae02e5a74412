//! HTTP API server for the practice backend

mod error;
pub mod health;
pub mod practice;
pub mod transcribe;

pub use error::ApiError;
pub use practice::SESSION_HEADER;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::audio::AudioStore;
use crate::config::{Config, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT, LifecycleConfig};
use crate::dialogue::{ColorPicker, RandomColor};
use crate::session::SessionStore;
use crate::speech::{Synthesizer, Transcriber};

/// Shared state for API handlers
pub struct ApiState {
    pub sessions: SessionStore,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub transcriber: Arc<dyn Transcriber>,
    pub color_picker: Arc<dyn ColorPicker>,
    pub audio: AudioStore,
    pub upload_dir: PathBuf,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    synthesizer: Arc<dyn Synthesizer>,
    transcriber: Arc<dyn Transcriber>,
    color_picker: Arc<dyn ColorPicker>,
    port: u16,
    audio_dir: PathBuf,
    upload_dir: PathBuf,
    video_dir: Option<PathBuf>,
    max_upload_bytes: usize,
    lifecycle: LifecycleConfig,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(synthesizer: Arc<dyn Synthesizer>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            synthesizer,
            transcriber,
            color_picker: Arc::new(RandomColor),
            port: DEFAULT_PORT,
            audio_dir: PathBuf::from("audio_files"),
            upload_dir: std::env::temp_dir(),
            video_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            lifecycle: LifecycleConfig::default(),
        }
    }

    /// Create a builder populated from loaded configuration
    #[must_use]
    pub fn from_config(
        config: &Config,
        synthesizer: Arc<dyn Synthesizer>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self::new(synthesizer, transcriber)
            .port(config.server.port)
            .audio_dir(config.server.audio_dir.clone())
            .upload_dir(config.server.upload_dir.clone())
            .video_dir(config.server.video_dir.clone())
            .max_upload_bytes(config.server.max_upload_bytes)
            .lifecycle(config.lifecycle)
    }

    /// Set the port to listen on
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the directory for generated audio
    #[must_use]
    pub fn audio_dir(mut self, dir: PathBuf) -> Self {
        self.audio_dir = dir;
        self
    }

    /// Set the directory for temporary uploads
    #[must_use]
    pub fn upload_dir(mut self, dir: PathBuf) -> Self {
        self.upload_dir = dir;
        self
    }

    /// Set the directory of hint videos served under `/videos`
    #[must_use]
    pub fn video_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.video_dir = dir;
        self
    }

    /// Set the request body limit
    #[must_use]
    pub const fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Set session and audio lifetimes
    #[must_use]
    pub const fn lifecycle(mut self, lifecycle: LifecycleConfig) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Override how practice colors are drawn
    #[must_use]
    pub fn color_picker(mut self, picker: Arc<dyn ColorPicker>) -> Self {
        self.color_picker = picker;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let sessions = SessionStore::new(self.lifecycle.max_sessions, self.lifecycle.session_ttl);

        let state = Arc::new(ApiState {
            sessions,
            synthesizer: self.synthesizer,
            transcriber: self.transcriber,
            color_picker: self.color_picker,
            audio: AudioStore::new(self.audio_dir),
            upload_dir: self.upload_dir,
        });

        ApiServer {
            state,
            port: self.port,
            video_dir: self.video_dir,
            max_upload_bytes: self.max_upload_bytes,
            audio_ttl: self.lifecycle.audio_ttl,
            sweep_interval: self.lifecycle.sweep_interval,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    video_dir: Option<PathBuf>,
    max_upload_bytes: usize,
    audio_ttl: Duration,
    sweep_interval: Duration,
}

impl ApiServer {
    /// Shared handler state
    #[must_use]
    pub fn state(&self) -> Arc<ApiState> {
        self.state.clone()
    }

    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(practice::router(self.state.clone()))
            .merge(transcribe::router(self.state.clone()))
            .merge(health::router())
            .merge(health::ready_router(self.state.clone()))
            .nest_service("/audio", ServeDir::new(self.state.audio.dir()));

        if let Some(video_dir) = &self.video_dir {
            router = router.nest_service("/videos", ServeDir::new(video_dir));
            tracing::info!(path = %video_dir.display(), "serving hint videos");
        }

        // CORS layer for cross-origin requests from the practice frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router
            .layer(DefaultBodyLimit::max(self.max_upload_bytes))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        let sweeper = self
            .state
            .audio
            .clone()
            .spawn_sweeper(self.audio_ttl, self.sweep_interval);

        tracing::info!(
            port = self.port,
            audio_dir = %self.state.audio.dir().display(),
            "API server listening"
        );

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("shutdown signal received");
                }
            })
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")));

        sweeper.abort();
        result
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
