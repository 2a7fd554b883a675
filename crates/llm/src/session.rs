//! Session resolution
//!
//! The client holds the session id between turns. A missing or blank id
//! opens a new session; anything else is used as-is and validated by the
//! provider on first use.

use std::sync::Arc;

use crate::backend::AssistantBackend;
use crate::LlmError;

/// Resolves client-held session ids against a backend
#[derive(Clone)]
pub struct ConversationSession {
    backend: Arc<dyn AssistantBackend>,
}

impl ConversationSession {
    pub fn new(backend: Arc<dyn AssistantBackend>) -> Self {
        Self { backend }
    }

    /// Return the session to use for this turn
    pub async fn resolve(&self, session_id: Option<&str>) -> Result<String, LlmError> {
        match session_id {
            Some(id) if !id.trim().is_empty() => Ok(id.to_string()),
            _ => {
                let id = self.backend.create_session().await?;
                tracing::info!(session_id = %id, backend = self.backend.name(), "Opened new session");
                Ok(id)
            },
        }
    }
}
