//! Text-to-speech
//!
//! `SpeechSynthesizer` drains a `TextToSpeech` stream into one buffer and
//! base64-encodes it for the response envelope. Failures are logged and
//! reported as `None`; whether that fails the turn is the caller's call.

mod elevenlabs;

pub use elevenlabs::{ElevenLabsConfig, ElevenLabsTts};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use voice_turn_config::TtsConfig;
use voice_turn_core::{SynthesisRequest, TextToSpeech};

use crate::PipelineError;

/// Synthesis adapter
#[derive(Clone)]
pub struct SpeechSynthesizer {
    tts: Arc<dyn TextToSpeech>,
    voice: String,
    model: String,
    timeout: Duration,
}

impl SpeechSynthesizer {
    pub fn new(
        tts: Arc<dyn TextToSpeech>,
        voice: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            tts,
            voice: voice.into(),
            model: model.into(),
            timeout,
        }
    }

    pub fn from_config(tts: Arc<dyn TextToSpeech>, config: &TtsConfig) -> Self {
        Self::new(
            tts,
            config.voice_id.clone(),
            config.model.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Synthesize with the default voice and model
    pub async fn synthesize(&self, text: &str) -> Option<String> {
        self.synthesize_with(text, &self.voice, &self.model).await
    }

    /// Synthesize with an explicit voice and model
    pub async fn synthesize_with(&self, text: &str, voice: &str, model: &str) -> Option<String> {
        let start = Instant::now();

        match self.synthesize_bytes(text, voice, model).await {
            Ok(bytes) => {
                tracing::info!(
                    model = self.tts.model_name(),
                    voice,
                    bytes = bytes.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Synthesis finished"
                );
                Some(BASE64.encode(bytes))
            },
            Err(e) => {
                tracing::error!(operation = "synthesize", voice, error = %e, "Error generating audio");
                None
            },
        }
    }

    /// Collect the whole audio stream, bounded by the configured timeout
    pub async fn synthesize_bytes(
        &self,
        text: &str,
        voice: &str,
        model: &str,
    ) -> Result<Vec<u8>, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::Synthesis("Nothing to synthesize".to_string()));
        }

        let request = SynthesisRequest { text, voice, model };

        let collect = async {
            let mut stream = self
                .tts
                .synthesize(request)
                .await
                .map_err(|e| PipelineError::Synthesis(e.to_string()))?;

            let mut audio = Vec::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| PipelineError::Synthesis(e.to_string()))?;
                audio.extend_from_slice(&chunk);
            }
            Ok::<_, PipelineError>(audio)
        };

        let audio = tokio::time::timeout(self.timeout, collect)
            .await
            .map_err(|_| PipelineError::Timeout)??;

        if audio.is_empty() {
            return Err(PipelineError::Synthesis("Provider returned no audio".to_string()));
        }

        Ok(audio)
    }
}
