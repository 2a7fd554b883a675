//! Conversational agent integration
//!
//! Features:
//! - `AssistantBackend` trait over a stateful, session-based agent provider
//! - OpenAI Assistants backend (threads, messages, runs)
//! - Session resolution (reuse a client-held id or open a new one)
//! - Bounded run polling until the agent's run reaches a terminal status

pub mod backend;
pub mod openai;
pub mod poller;
pub mod session;

pub use backend::{AssistantBackend, MessageContent, MessageRole, Run, RunStatus, SortOrder, ThreadMessage};
pub use openai::{OpenAiAssistant, OpenAiAssistantConfig};
pub use poller::{PollConfig, RunPoller};
pub use session::ConversationSession;

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Run {run_id} still pending after {attempts} status checks ({elapsed_ms}ms)")]
    Timeout {
        run_id: String,
        attempts: u32,
        elapsed_ms: u64,
    },

    #[error("Run {run_id} ended with status '{status}'")]
    RunNotCompleted { run_id: String, status: String },

    #[error("Session has no reply text")]
    EmptyReply,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Timeout { .. })
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}
