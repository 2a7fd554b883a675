//! Run completion polling
//!
//! A turn against the agent is: append the user message, start a run, poll
//! the run until it leaves `queued`/`in_progress`, then read the newest
//! message in the session. The poll is bounded by both an attempt count and
//! a wall-clock deadline, and sleeps with `tokio::time::sleep` so the worker
//! thread is free between checks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use voice_turn_config::AssistantConfig;

use crate::backend::{AssistantBackend, MessageRole, Run, RunStatus, SortOrder};
use crate::LlmError;

/// Polling bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between status checks
    pub interval: Duration,
    /// Status checks before giving up
    pub max_attempts: u32,
    /// Overall deadline for one run
    pub timeout: Duration,
}

impl PollConfig {
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
            timeout: config.poll_timeout(),
        }
    }
}

/// Drives one agent run from submission to reply
#[derive(Clone)]
pub struct RunPoller {
    backend: Arc<dyn AssistantBackend>,
    assistant_id: String,
    config: PollConfig,
}

impl RunPoller {
    pub fn new(
        backend: Arc<dyn AssistantBackend>,
        assistant_id: impl Into<String>,
        config: PollConfig,
    ) -> Self {
        Self {
            backend,
            assistant_id: assistant_id.into(),
            config,
        }
    }

    pub fn from_config(backend: Arc<dyn AssistantBackend>, config: &AssistantConfig) -> Self {
        Self::new(backend, config.assistant_id.clone(), PollConfig::from_config(config))
    }

    /// Append the utterance and start a run over the session
    pub async fn submit(&self, session_id: &str, utterance: &str) -> Result<Run, LlmError> {
        self.backend
            .append_message(session_id, MessageRole::User, utterance)
            .await?;

        let run = self.backend.start_run(session_id, &self.assistant_id).await?;
        tracing::debug!(session_id, run_id = %run.id, status = %run.status, "Run started");
        Ok(run)
    }

    /// Re-fetch the run until its status is terminal
    pub async fn await_completion(&self, session_id: &str, run: Run) -> Result<Run, LlmError> {
        let start = Instant::now();
        let mut run = run;
        let mut attempts = 0u32;

        while run.status.is_pending() {
            if attempts >= self.config.max_attempts || start.elapsed() >= self.config.timeout {
                tracing::warn!(
                    session_id,
                    run_id = %run.id,
                    status = %run.status,
                    attempts,
                    "Run did not finish in time"
                );
                return Err(LlmError::Timeout {
                    run_id: run.id,
                    attempts,
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
            }

            tokio::time::sleep(self.config.interval).await;
            run = self.backend.get_run(session_id, &run.id).await?;
            attempts += 1;

            tracing::trace!(session_id, run_id = %run.id, status = %run.status, attempt = attempts, "Polled run");
        }

        tracing::debug!(
            session_id,
            run_id = %run.id,
            status = %run.status,
            attempts,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Run reached terminal status"
        );
        Ok(run)
    }

    /// Text of the newest message in the session
    pub async fn fetch_reply(&self, session_id: &str) -> Result<String, LlmError> {
        let messages = self
            .backend
            .list_messages(session_id, SortOrder::Desc, 1)
            .await?;

        messages
            .first()
            .and_then(|m| m.text())
            .map(str::to_string)
            .ok_or(LlmError::EmptyReply)
    }

    /// Submit, wait and read the reply; only a `completed` run yields text
    pub async fn run_turn(&self, session_id: &str, utterance: &str) -> Result<String, LlmError> {
        let run = self.submit(session_id, utterance).await?;
        let run = self.await_completion(session_id, run).await?;

        if run.status != RunStatus::Completed {
            return Err(LlmError::RunNotCompleted {
                run_id: run.id,
                status: run.status.to_string(),
            });
        }

        self.fetch_reply(session_id).await
    }
}
