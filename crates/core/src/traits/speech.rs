//! Speech processing traits

use crate::{AudioFormat, Result, TranscriptionOptions, TranscriptionResult};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Chunked audio as returned by a synthesis provider
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// Speech-to-Text interface
///
/// Implementations:
/// - `DeepgramStt` - hosted pre-recorded transcription
///
/// # Example
///
/// ```ignore
/// let stt: Arc<dyn SpeechToText> = Arc::new(DeepgramStt::new(config)?);
/// let result = stt.transcribe(&bytes, AudioFormat::Ogg, &options).await?;
/// println!("Transcribed: {:?}", result.best());
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Transcribe a complete recording
    ///
    /// # Arguments
    /// * `audio` - Raw container bytes as uploaded
    /// * `format` - Container format, used for the request content type
    /// * `options` - Recognition profile
    async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
        options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

/// Parameters for one synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub voice: &'a str,
    pub model: &'a str,
}

/// Text-to-Speech interface
///
/// Implementations:
/// - `ElevenLabsTts` - hosted streaming synthesis
#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    /// Start synthesis and return the audio as a stream of chunks
    async fn synthesize(&self, request: SynthesisRequest<'_>) -> Result<AudioStream>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
