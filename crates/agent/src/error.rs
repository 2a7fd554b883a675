//! Turn error kinds and their client-facing messages

use thiserror::Error;

use voice_turn_llm::LlmError;
use voice_turn_pipeline::PipelineError;

/// Why a turn failed
#[derive(Error, Debug, Clone)]
pub enum TurnError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Staging failed: {0}")]
    Staging(#[source] PipelineError),

    #[error("Transcription failed: {0}")]
    Transcription(#[source] PipelineError),

    #[error("Agent failed: {0}")]
    Agent(#[source] LlmError),

    #[error("Agent timed out: {0}")]
    Timeout(#[source] LlmError),

    #[error("Synthesis produced no audio")]
    Synthesis,
}

impl TurnError {
    /// Message placed in the failure envelope
    pub fn message(&self) -> String {
        match self {
            TurnError::InvalidInput(desc) => format!("Error: {}", desc),
            TurnError::Staging(_) | TurnError::Transcription(_) => {
                "Failed to generate transcript".to_string()
            },
            TurnError::Agent(_) => "Error processing data".to_string(),
            TurnError::Timeout(_) => "Timed out waiting for agent response".to_string(),
            TurnError::Synthesis => "Failed to generate audio".to_string(),
        }
    }

    /// Short kind label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            TurnError::InvalidInput(_) => "invalid_input",
            TurnError::Staging(_) => "staging",
            TurnError::Transcription(_) => "transcription",
            TurnError::Agent(_) => "agent",
            TurnError::Timeout(_) => "timeout",
            TurnError::Synthesis => "synthesis",
        }
    }
}

impl From<LlmError> for TurnError {
    fn from(err: LlmError) -> Self {
        if err.is_timeout() {
            TurnError::Timeout(err)
        } else {
            TurnError::Agent(err)
        }
    }
}
