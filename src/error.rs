//! Error types for the practice backend

use thiserror::Error;

/// Result type alias for practice backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the practice backend
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A required request field was missing or malformed
    #[error("validation error: {0}")]
    Validation(String),

    /// Help or retry was requested before any color was assigned
    #[error("no color is currently being practiced")]
    NoActiveColor,

    /// Text-to-speech error
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Speech-to-text error
    #[error("transcription error: {0}")]
    Transcription(String),

    /// The session registry is full and cannot admit a new session
    #[error("session limit of {0} reached")]
    SessionLimit(u64),

    /// Generated audio storage error
    #[error("audio store error: {0}")]
    AudioStore(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
