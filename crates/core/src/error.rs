//! Error types shared by provider backends

use thiserror::Error;

/// Core errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("STT error: {0}")]
    Stt(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
