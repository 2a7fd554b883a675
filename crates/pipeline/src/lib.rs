//! Audio side of a conversation turn
//!
//! - Upload staging with per-request file names and guaranteed cleanup
//! - Speech-to-text adapter and the Deepgram backend
//! - Text-to-speech adapter and the ElevenLabs backend

pub mod staging;
pub mod stt;
pub mod tts;

pub use staging::{AudioStagingArea, AudioUpload, StagedAudio, UploadedAudio};
pub use stt::{DeepgramConfig, DeepgramStt, Transcriber};
pub use tts::{ElevenLabsConfig, ElevenLabsTts, SpeechSynthesizer};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("Staging error: {0}")]
    Staging(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Transcript was empty")]
    EmptyTranscript,

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Timeout")]
    Timeout,
}
