//! Text-to-speech (TTS) over HTTP

use async_trait::async_trait;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};

use super::Synthesizer;
use crate::config::VoiceSettings;
use crate::{Error, Result};

/// TTS provider backend with its provider-specific parameters
#[derive(Clone, Debug)]
enum Backend {
    OpenAI {
        speed: f32,
    },
    ElevenLabs {
        output_format: String,
        settings: VoiceSettings,
    },
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    voice: String,
    model: String,
    backend: Backend,
}

impl TextToSpeech {
    /// Create a new TTS instance using `OpenAI`
    ///
    /// # Errors
    ///
    /// Returns error if API key is empty
    pub fn new_openai(
        api_key: &SecretString,
        voice: String,
        model: String,
        speed: f32,
    ) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: SecretString::new(api_key.expose_secret().into()),
            voice,
            model,
            backend: Backend::OpenAI { speed },
        })
    }

    /// Create a new TTS instance using ElevenLabs
    ///
    /// # Errors
    ///
    /// Returns error if API key is empty
    pub fn new_elevenlabs(
        api_key: &SecretString,
        voice_id: String,
        model: String,
        output_format: String,
        settings: VoiceSettings,
    ) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: SecretString::new(api_key.expose_secret().into()),
            voice: voice_id,
            model,
            backend: Backend::ElevenLabs {
                output_format,
                settings,
            },
        })
    }

    /// Synthesize using OpenAI TTS
    async fn synthesize_openai(&self, text: &str, speed: f32) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            response_format: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            response_format: "mp3",
            speed,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "OpenAI TTS error");
            return Err(Error::Synthesis(format!("OpenAI TTS error {status}: {body}")));
        }

        collect_audio(response).await
    }

    /// Synthesize using ElevenLabs TTS
    async fn synthesize_elevenlabs(
        &self,
        text: &str,
        output_format: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
            voice_settings: &'a VoiceSettings,
        }

        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}",
            self.voice
        );

        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
            voice_settings: settings,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("output_format", output_format)])
            .header("xi-api-key", self.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "ElevenLabs TTS error");
            return Err(Error::Synthesis(format!(
                "ElevenLabs TTS error {status}: {body}"
            )));
        }

        collect_audio(response).await
    }
}

#[async_trait]
impl Synthesizer for TextToSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        tracing::debug!(provider = self.name(), chars = text.len(), "synthesizing");
        match &self.backend {
            Backend::OpenAI { speed } => self.synthesize_openai(text, *speed).await,
            Backend::ElevenLabs {
                output_format,
                settings,
            } => {
                self.synthesize_elevenlabs(text, output_format, settings)
                    .await
            }
        }
    }

    fn name(&self) -> &'static str {
        match self.backend {
            Backend::OpenAI { .. } => "openai",
            Backend::ElevenLabs { .. } => "elevenlabs",
        }
    }
}

/// Drain a streamed audio body, skipping empty chunks
async fn collect_audio(response: reqwest::Response) -> Result<Vec<u8>> {
    let mut stream = std::pin::pin!(response.bytes_stream());
    let mut audio = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if !chunk.is_empty() {
            audio.extend_from_slice(&chunk);
        }
    }

    if audio.is_empty() {
        return Err(Error::Synthesis("provider returned no audio".to_string()));
    }

    Ok(audio)
}
