//! Sign Coach - voice-driven practice backend for sign-language color signs
//!
//! This library provides the core functionality for the practice service:
//! - A pure dialogue state machine that assigns colors, gives hints and
//!   prompts retries
//! - Per-session state keyed by session identifier
//! - Speech synthesis and transcription through external providers
//! - An HTTP API serving prompts, generated audio and transcriptions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  HTTP API (axum)                     │
//! │  /start  /user-response  /help  /retry  /transcribe  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │   Sessions  │  Dialogue state machine  │  Audio store│
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │        Speech providers (ElevenLabs, OpenAI)         │
//! │              TTS        │        STT                 │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod audio;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod session;
pub mod speech;

pub use api::{ApiServer, ApiServerBuilder, ApiState};
pub use audio::AudioStore;
pub use config::Config;
pub use dialogue::{Color, ColorPicker, DialogueState, Effect, Event, Phase, Transition};
pub use error::{Error, Result};
pub use session::{Session, SessionId, SessionStore};
pub use speech::{SpeechToText, Synthesizer, TextToSpeech, Transcriber};
