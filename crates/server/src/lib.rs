//! Voice Turn Server
//!
//! HTTP endpoints for text and audio conversation turns.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, record_latency, record_request};
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] voice_turn_config::ConfigError),

    #[error("Provider setup failed: {0}")]
    Provider(String),

    #[error("Metrics error: {0}")]
    Metrics(String),
}

impl From<voice_turn_pipeline::PipelineError> for ServerError {
    fn from(err: voice_turn_pipeline::PipelineError) -> Self {
        ServerError::Provider(err.to_string())
    }
}

impl From<voice_turn_llm::LlmError> for ServerError {
    fn from(err: voice_turn_llm::LlmError) -> Self {
        ServerError::Provider(err.to_string())
    }
}
