//! Core traits and types for the voice turn service
//!
//! This crate provides foundational types used across all other crates:
//! - Speech provider traits (STT, TTS) for pluggable backends
//! - Audio container formats
//! - Transcript types
//! - Error types

pub mod audio;
pub mod error;
pub mod traits;
pub mod transcript;

pub use audio::AudioFormat;
pub use error::{Error, Result};
pub use transcript::{TranscriptAlternative, TranscriptionOptions, TranscriptionResult};

pub use traits::{AudioStream, SpeechToText, SynthesisRequest, TextToSpeech};
