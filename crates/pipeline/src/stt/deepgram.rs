//! Deepgram pre-recorded transcription backend
//!
//! Sends the whole recording in one request to `/v1/listen` and maps the
//! first channel's alternatives into a `TranscriptionResult`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use voice_turn_config::SttConfig;
use voice_turn_core::{
    AudioFormat, Error, Result, SpeechToText, TranscriptAlternative, TranscriptionOptions,
    TranscriptionResult,
};

use crate::PipelineError;

/// Deepgram backend configuration
#[derive(Debug, Clone)]
pub struct DeepgramConfig {
    /// API base URL
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl From<&SttConfig> for DeepgramConfig {
    fn from(config: &SttConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListenResponse {
    #[serde(default)]
    results: Option<ListenResults>,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Deserialize)]
struct ListenChannel {
    #[serde(default)]
    alternatives: Vec<TranscriptAlternative>,
}

impl From<ListenResponse> for TranscriptionResult {
    fn from(response: ListenResponse) -> Self {
        let alternatives = response
            .results
            .and_then(|r| r.channels.into_iter().next())
            .map(|c| c.alternatives)
            .unwrap_or_default();

        TranscriptionResult { alternatives }
    }
}

/// Deepgram speech-to-text backend
pub struct DeepgramStt {
    config: DeepgramConfig,
    client: Client,
    model_name: String,
}

impl DeepgramStt {
    pub fn new(config: DeepgramConfig) -> std::result::Result<Self, PipelineError> {
        if config.api_key.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "DEEPGRAM_API_KEY not set. Set it via environment or config.".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            model_name: "deepgram".to_string(),
        })
    }

    fn listen_url(&self) -> String {
        format!("{}/v1/listen", self.config.endpoint)
    }
}

#[async_trait]
impl SpeechToText for DeepgramStt {
    async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
        options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult> {
        let smart_format = if options.smart_format { "true" } else { "false" };

        let response = self
            .client
            .post(self.listen_url())
            .query(&[("model", options.model.as_str()), ("smart_format", smart_format)])
            .header("Authorization", format!("Token {}", self.config.api_key))
            .header("Content-Type", format.mime_type())
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| Error::Network(format!("Deepgram request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read Deepgram response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Stt(format!("Deepgram returned HTTP {}: {}", status, body)));
        }

        tracing::debug!(body = %body, "Deepgram response");

        let parsed: ListenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Stt(format!("Failed to parse Deepgram response: {}", e)))?;

        Ok(parsed.into())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
