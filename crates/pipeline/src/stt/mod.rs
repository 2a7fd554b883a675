//! Speech-to-text
//!
//! `Transcriber` wraps any `SpeechToText` backend with a fixed recognition
//! profile and turns its result into a usable utterance.

mod deepgram;

pub use deepgram::{DeepgramConfig, DeepgramStt};

use std::sync::Arc;
use std::time::Instant;

use voice_turn_config::SttConfig;
use voice_turn_core::{AudioFormat, SpeechToText, TranscriptionOptions};

use crate::PipelineError;

/// Transcription adapter
#[derive(Clone)]
pub struct Transcriber {
    stt: Arc<dyn SpeechToText>,
    options: TranscriptionOptions,
}

impl Transcriber {
    pub fn new(stt: Arc<dyn SpeechToText>, options: TranscriptionOptions) -> Self {
        Self { stt, options }
    }

    /// Build with the recognition profile from settings
    pub fn from_config(stt: Arc<dyn SpeechToText>, config: &SttConfig) -> Self {
        Self::new(
            stt,
            TranscriptionOptions {
                model: config.model.clone(),
                smart_format: config.smart_format,
            },
        )
    }

    pub fn options(&self) -> &TranscriptionOptions {
        &self.options
    }

    /// Transcribe a recording into an utterance
    ///
    /// A blank best alternative is an error, same as a provider failure.
    pub async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
    ) -> Result<String, PipelineError> {
        let start = Instant::now();

        let result = self
            .stt
            .transcribe(audio, format, &self.options)
            .await
            .map_err(|e| PipelineError::Transcription(e.to_string()))?;

        let transcript = result.best().map(str::trim).unwrap_or_default();

        tracing::info!(
            model = self.stt.model_name(),
            alternatives = result.alternatives.len(),
            chars = transcript.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Transcription finished"
        );

        if transcript.is_empty() {
            return Err(PipelineError::EmptyTranscript);
        }

        Ok(transcript.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use voice_turn_core::{Error, Result, TranscriptionResult};

    struct FixedStt {
        outcome: Mutex<Option<Result<TranscriptionResult>>>,
        seen: Mutex<Vec<(usize, AudioFormat, TranscriptionOptions)>>,
    }

    impl FixedStt {
        fn new(outcome: Result<TranscriptionResult>) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Some(outcome)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SpeechToText for FixedStt {
        async fn transcribe(
            &self,
            audio: &[u8],
            format: AudioFormat,
            options: &TranscriptionOptions,
        ) -> Result<TranscriptionResult> {
            self.seen.lock().push((audio.len(), format, options.clone()));
            self.outcome
                .lock()
                .take()
                .unwrap_or_else(|| Ok(TranscriptionResult::default()))
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_transcribe_returns_trimmed_best() {
        let stt = FixedStt::new(Ok(TranscriptionResult::single("  Hello there. ", 0.98)));
        let transcriber = Transcriber::new(stt.clone(), TranscriptionOptions::default());

        let text = transcriber.transcribe(b"audio", AudioFormat::Ogg).await.unwrap();
        assert_eq!(text, "Hello there.");

        let seen = stt.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, 5);
        assert_eq!(seen[0].1, AudioFormat::Ogg);
        assert_eq!(seen[0].2.model, "nova-2");
        assert!(seen[0].2.smart_format);
    }

    #[tokio::test]
    async fn test_blank_transcripts_are_errors() {
        for blank in ["", "   ", "\n\t "] {
            let stt = FixedStt::new(Ok(TranscriptionResult::single(blank, 0.0)));
            let transcriber = Transcriber::new(stt, TranscriptionOptions::default());
            let err = transcriber.transcribe(b"audio", AudioFormat::Ogg).await.unwrap_err();
            assert!(matches!(err, PipelineError::EmptyTranscript));
        }
    }

    #[tokio::test]
    async fn test_no_alternatives_is_error() {
        let stt = FixedStt::new(Ok(TranscriptionResult::default()));
        let transcriber = Transcriber::new(stt, TranscriptionOptions::default());
        let err = transcriber.transcribe(b"audio", AudioFormat::Wav).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyTranscript));
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_transcription() {
        let stt = FixedStt::new(Err(Error::Stt("corrupt audio".to_string())));
        let transcriber = Transcriber::new(stt, TranscriptionOptions::default());
        let err = transcriber.transcribe(b"garbage", AudioFormat::Ogg).await.unwrap_err();
        assert!(matches!(err, PipelineError::Transcription(msg) if msg.contains("corrupt audio")));
    }

    #[test]
    fn test_from_config_uses_profile() {
        let stt = FixedStt::new(Ok(TranscriptionResult::default()));
        let config = SttConfig {
            model: "nova-3".to_string(),
            smart_format: false,
            ..Default::default()
        };
        let transcriber = Transcriber::from_config(stt, &config);
        assert_eq!(transcriber.options().model, "nova-3");
        assert!(!transcriber.options().smart_format);
    }
}
