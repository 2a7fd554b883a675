//! Conversation turn orchestration
//!
//! Features:
//! - Text turns: utterance -> agent run -> optional synthesis
//! - Audio turns: staging -> transcription -> text turn
//! - Closed error kinds mapped to a uniform response envelope
//! - Panic boundary so callers always receive an envelope

pub mod envelope;
pub mod error;
pub mod orchestrator;

pub use envelope::ResponseEnvelope;
pub use error::TurnError;
pub use orchestrator::TurnOrchestrator;
