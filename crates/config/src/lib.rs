//! Configuration management for the voice turn service
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default.*`, `config/{env}.*`)
//! - A `.env` file and environment variables (VOICE_TURN_ prefix)
//! - The provider credential variables the deployment already uses
//!   (`DEEPGRAM_API_KEY`, `OPENAI_API_KEY`, `ASSISTANT_ID_KEY`, `ELEVENLABS_API_KEY`)

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, AssistantConfig, ObservabilityConfig, RuntimeEnvironment, ServerConfig,
    Settings, StagingConfig, SttConfig, TtsConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
