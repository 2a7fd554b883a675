//! ElevenLabs streaming synthesis backend

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use voice_turn_config::TtsConfig;
use voice_turn_core::{AudioStream, Error, Result, SynthesisRequest, TextToSpeech};

use crate::PipelineError;

/// ElevenLabs backend configuration
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API base URL
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Connect timeout; the adapter bounds the full stream separately
    pub connect_timeout: Duration,
}

impl From<&TtsConfig> for ElevenLabsConfig {
    fn from(config: &TtsConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            connect_timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

#[derive(Debug, Serialize)]
struct TextToSpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs text-to-speech backend
pub struct ElevenLabsTts {
    config: ElevenLabsConfig,
    client: Client,
}

impl ElevenLabsTts {
    pub fn new(config: ElevenLabsConfig) -> std::result::Result<Self, PipelineError> {
        if config.api_key.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "ELEVENLABS_API_KEY not set. Set it via environment or config.".to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| PipelineError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn stream_url(&self, voice: &str) -> String {
        format!("{}/v1/text-to-speech/{}/stream", self.config.endpoint, voice)
    }
}

#[async_trait]
impl TextToSpeech for ElevenLabsTts {
    async fn synthesize(&self, request: SynthesisRequest<'_>) -> Result<AudioStream> {
        let body = TextToSpeechBody {
            text: request.text,
            model_id: request.model,
        };

        let response = self
            .client
            .post(self.stream_url(request.voice))
            .header("xi-api-key", &self.config.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("ElevenLabs request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs returned HTTP {}: {}", status, error_text)));
        }

        let stream = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| Error::Network(format!("ElevenLabs stream interrupted: {}", e)))
        });

        Ok(Box::pin(stream))
    }

    fn model_name(&self) -> &str {
        "elevenlabs"
    }
}
