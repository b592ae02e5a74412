//! Speech collaborators
//!
//! Synthesis (text → audio) and transcription (audio → text) are external
//! services reached over HTTP. The rest of the crate only sees the
//! [`Synthesizer`] and [`Transcriber`] traits.

mod stt;
mod tts;

use std::sync::Arc;

use async_trait::async_trait;

pub use stt::{SpeechToText, mime_for};
pub use tts::TextToSpeech;

use crate::config::{Config, SttProvider, TtsProvider};
use crate::{Error, Result};

/// Turns prompt text into audio
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text`, returning encoded audio bytes (MP3)
    ///
    /// # Errors
    ///
    /// Returns error if the provider call fails or returns no audio
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Turns recorded audio into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe `audio`; `file_name` hints at the container format
    ///
    /// # Errors
    ///
    /// Returns error if the provider call fails
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Build the configured synthesizer
///
/// # Errors
///
/// Returns error if the provider's API key is missing
pub fn synthesizer_from_config(config: &Config) -> Result<Arc<dyn Synthesizer>> {
    let voice = &config.voice;
    let tts = match voice.tts_provider {
        TtsProvider::ElevenLabs => {
            let key = config.api_keys.elevenlabs.as_ref().ok_or_else(|| {
                Error::Config("ELEVENLABS_API_KEY required for ElevenLabs TTS".to_string())
            })?;
            TextToSpeech::new_elevenlabs(
                key,
                voice.tts_voice.clone(),
                voice.tts_model.clone(),
                voice.output_format.clone(),
                voice.voice_settings,
            )?
        }
        TtsProvider::OpenAI => {
            let key = config.api_keys.openai.as_ref().ok_or_else(|| {
                Error::Config("OPENAI_API_KEY required for OpenAI TTS".to_string())
            })?;
            TextToSpeech::new_openai(
                key,
                voice.tts_voice.clone(),
                voice.tts_model.clone(),
                voice.tts_speed,
            )?
        }
    };

    tracing::info!(provider = tts.name(), model = %voice.tts_model, "synthesizer ready");
    Ok(Arc::new(tts))
}

/// Build the configured transcriber
///
/// # Errors
///
/// Returns error if the provider's API key is missing
pub fn transcriber_from_config(config: &Config) -> Result<Arc<dyn Transcriber>> {
    let voice = &config.voice;
    let stt = match voice.stt_provider {
        SttProvider::Whisper => {
            let key = config.api_keys.openai.as_ref().ok_or_else(|| {
                Error::Config("OPENAI_API_KEY required for Whisper".to_string())
            })?;
            SpeechToText::new_whisper(key, voice.stt_model.clone())?
        }
        SttProvider::Deepgram => {
            let key = config.api_keys.deepgram.as_ref().ok_or_else(|| {
                Error::Config("DEEPGRAM_API_KEY required for Deepgram".to_string())
            })?;
            SpeechToText::new_deepgram(key, voice.stt_model.clone())?
        }
    };

    tracing::info!(provider = stt.name(), model = %voice.stt_model, "transcriber ready");
    Ok(Arc::new(stt))
}
