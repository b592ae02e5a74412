//! Configuration management for the practice backend
//!
//! Values resolve in order: environment, TOML file, built-in default.

pub mod file;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use serde::Serialize;

use crate::{Error, Result};
use file::CoachConfigFile;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5001;

/// Whisper rejects uploads above 25 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// ElevenLabs "Adam" pre-made voice
const DEFAULT_ELEVENLABS_VOICE: &str = "pNInz6obpgDQGcFmaJgB";
const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_turbo_v2_5";
const DEFAULT_OUTPUT_FORMAT: &str = "mp3_22050_32";
const DEFAULT_OPENAI_VOICE: &str = "alloy";
const DEFAULT_OPENAI_MODEL: &str = "tts-1";

/// Practice backend configuration
#[derive(Debug)]
pub struct Config {
    /// API keys
    pub api_keys: ApiKeys,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// Session and audio lifetimes
    pub lifecycle: LifecycleConfig,
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// `ElevenLabs` API key (default TTS)
    pub elevenlabs: Option<SecretString>,

    /// `OpenAI` API key (Whisper STT, optional TTS)
    pub openai: Option<SecretString>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<SecretString>,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Directory holding generated audio, created on demand
    pub audio_dir: PathBuf,

    /// Directory for temporary uploads awaiting transcription
    pub upload_dir: PathBuf,

    /// Directory of static hint videos served under `/videos`
    pub video_dir: Option<PathBuf>,

    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

/// Text-to-speech provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TtsProvider {
    #[default]
    ElevenLabs,
    OpenAI,
}

impl FromStr for TtsProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elevenlabs" | "eleven_labs" => Ok(Self::ElevenLabs),
            "openai" => Ok(Self::OpenAI),
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }
}

/// Speech-to-text provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SttProvider {
    #[default]
    Whisper,
    Deepgram,
}

impl FromStr for SttProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whisper" | "openai" => Ok(Self::Whisper),
            "deepgram" => Ok(Self::Deepgram),
            other => Err(Error::Config(format!("unknown STT provider: {other}"))),
        }
    }
}

/// ElevenLabs voice settings, sent verbatim
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.0,
            similarity_boost: 1.0,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    pub tts_provider: TtsProvider,

    /// TTS model (e.g. "`eleven_turbo_v2_5`", "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// ElevenLabs output format
    pub output_format: String,

    /// `OpenAI` TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,

    pub voice_settings: VoiceSettings,

    pub stt_provider: SttProvider,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,
}

/// Session and generated-audio lifetimes
#[derive(Debug, Clone, Copy)]
pub struct LifecycleConfig {
    /// Sessions idle this long are dropped
    pub session_ttl: Duration,

    /// Upper bound on live sessions
    pub max_sessions: u64,

    /// Generated audio older than this is deleted
    pub audio_ttl: Duration,

    /// How often the audio sweeper runs
    pub sweep_interval: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(30 * 60),
            max_sessions: 10_000,
            audio_ttl: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a provider name is not recognized
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::resolve(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a provider name is not recognized
    pub fn resolve(fc: CoachConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret = |value: Option<String>| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| SecretString::new(v.into()))
        };
        let parsed = |key: &str| env(key).and_then(|v| v.parse::<u64>().ok());

        // API keys (env > toml > None)
        let api_keys = ApiKeys {
            elevenlabs: secret(env("ELEVENLABS_API_KEY").or(fc.api_keys.elevenlabs)),
            openai: secret(env("OPENAI_API_KEY").or(fc.api_keys.openai)),
            deepgram: secret(env("DEEPGRAM_API_KEY").or(fc.api_keys.deepgram)),
        };

        // Server config (env > toml > default)
        let server = ServerConfig {
            port: env("SIGN_COACH_PORT")
                .or_else(|| env("PORT"))
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            audio_dir: env("SIGN_COACH_AUDIO_DIR")
                .or(fc.server.audio_dir)
                .map_or_else(|| PathBuf::from("audio_files"), PathBuf::from),
            upload_dir: env("SIGN_COACH_UPLOAD_DIR")
                .or(fc.server.upload_dir)
                .map_or_else(std::env::temp_dir, PathBuf::from),
            video_dir: env("SIGN_COACH_VIDEO_DIR")
                .or(fc.server.video_dir)
                .map(PathBuf::from),
            max_upload_bytes: env("SIGN_COACH_MAX_UPLOAD_BYTES")
                .and_then(|s| s.parse().ok())
                .or(fc.server.max_upload_bytes)
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };

        // Voice config (env > toml > provider default)
        let fv = fc.voice;
        let tts_provider = env("SIGN_COACH_TTS_PROVIDER")
            .or(fv.tts_provider)
            .map(|s| s.parse::<TtsProvider>())
            .transpose()?
            .unwrap_or_default();
        let (default_voice, default_model) = match tts_provider {
            TtsProvider::ElevenLabs => (DEFAULT_ELEVENLABS_VOICE, DEFAULT_ELEVENLABS_MODEL),
            TtsProvider::OpenAI => (DEFAULT_OPENAI_VOICE, DEFAULT_OPENAI_MODEL),
        };
        let stt_provider = env("SIGN_COACH_STT_PROVIDER")
            .or(fv.stt_provider)
            .map(|s| s.parse::<SttProvider>())
            .transpose()?
            .unwrap_or_default();
        let default_stt_model = match stt_provider {
            SttProvider::Whisper => "whisper-1",
            SttProvider::Deepgram => "nova-2",
        };

        let defaults = VoiceSettings::default();
        let voice = VoiceConfig {
            tts_provider,
            tts_model: env("SIGN_COACH_TTS_MODEL")
                .or(fv.tts_model)
                .unwrap_or_else(|| default_model.to_string()),
            tts_voice: env("SIGN_COACH_TTS_VOICE")
                .or(fv.tts_voice)
                .unwrap_or_else(|| default_voice.to_string()),
            output_format: fv
                .output_format
                .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string()),
            tts_speed: fv.tts_speed.unwrap_or(1.0),
            voice_settings: VoiceSettings {
                stability: fv.stability.unwrap_or(defaults.stability),
                similarity_boost: fv.similarity_boost.unwrap_or(defaults.similarity_boost),
                style: fv.style.unwrap_or(defaults.style),
                use_speaker_boost: fv.use_speaker_boost.unwrap_or(defaults.use_speaker_boost),
            },
            stt_provider,
            stt_model: env("SIGN_COACH_STT_MODEL")
                .or(fv.stt_model)
                .unwrap_or_else(|| default_stt_model.to_string()),
        };

        // Lifecycle (env > toml > default)
        let fl = fc.lifecycle;
        let lifecycle_defaults = LifecycleConfig::default();
        let secs = |env_value: Option<u64>, file_value: Option<u64>, fallback: Duration| {
            env_value
                .or(file_value)
                .map_or(fallback, Duration::from_secs)
        };
        let lifecycle = LifecycleConfig {
            session_ttl: secs(
                parsed("SIGN_COACH_SESSION_TTL_SECS"),
                fl.session_ttl_secs,
                lifecycle_defaults.session_ttl,
            ),
            max_sessions: parsed("SIGN_COACH_MAX_SESSIONS")
                .or(fl.max_sessions)
                .unwrap_or(lifecycle_defaults.max_sessions),
            audio_ttl: secs(
                parsed("SIGN_COACH_AUDIO_TTL_SECS"),
                fl.audio_ttl_secs,
                lifecycle_defaults.audio_ttl,
            ),
            sweep_interval: secs(
                parsed("SIGN_COACH_SWEEP_INTERVAL_SECS"),
                fl.sweep_interval_secs,
                lifecycle_defaults.sweep_interval,
            ),
        };

        Ok(Self {
            api_keys,
            server,
            voice,
            lifecycle,
        })
    }
}
