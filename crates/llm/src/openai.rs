//! OpenAI Assistants backend
//!
//! Threads are sessions, runs execute the configured assistant over a
//! thread. Reads (run status, message listing) are retried with exponential
//! backoff on network errors and 5xx responses; writes are sent once so a
//! retry can never append a message twice.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use voice_turn_config::AssistantConfig;

use crate::backend::{AssistantBackend, MessageRole, Run, SortOrder, ThreadMessage};
use crate::LlmError;

/// OpenAI Assistants configuration
#[derive(Debug, Clone)]
pub struct OpenAiAssistantConfig {
    /// API base URL (without /v1)
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for reads
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
}

impl Default for OpenAiAssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

impl From<&AssistantConfig> for OpenAiAssistantConfig {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
            max_retries: config.max_retries,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<ThreadMessage>,
}

/// OpenAI Assistants API client
pub struct OpenAiAssistant {
    config: OpenAiAssistantConfig,
    client: Client,
}

impl OpenAiAssistant {
    pub fn new(config: OpenAiAssistantConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "OPENAI_API_KEY not set. Set it via environment or config.".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.endpoint, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    /// Send once and decode the JSON body
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, LlmError> {
        let response = self.authorized(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, error_text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Send a GET with retries on transient failures
    async fn execute_get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, LlmError> {
        let mut backoff = self.config.initial_backoff;
        let mut attempt = 0;

        loop {
            let request = self.client.get(url).query(query);
            match self.execute::<T>(request).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.config.max_retries && Self::is_retryable(&e) => {
                    attempt += 1;
                    tracing::warn!(
                        url,
                        error = %e,
                        "Assistant request failed, retrying in {:?} (attempt {}/{})",
                        backoff,
                        attempt,
                        self.config.max_retries
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                },
                Err(e) => return Err(e),
            }
        }
    }

    fn status_error(status: StatusCode, body: String) -> LlmError {
        if status.is_server_error() {
            LlmError::Network(format!("HTTP {}: {}", status, body))
        } else {
            LlmError::Api(format!("HTTP {}: {}", status, body))
        }
    }

    /// 5xx and transport errors are retryable, 4xx are not
    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_))
    }
}

#[async_trait]
impl AssistantBackend for OpenAiAssistant {
    async fn create_session(&self) -> Result<String, LlmError> {
        let request = self
            .client
            .post(self.api_url("threads"))
            .json(&serde_json::json!({}));
        let thread: ThreadObject = self.execute(request).await?;
        Ok(thread.id)
    }

    async fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), LlmError> {
        let request = self
            .client
            .post(self.api_url(&format!("threads/{}/messages", session_id)))
            .json(&CreateMessageRequest { role, content });
        let _: serde_json::Value = self.execute(request).await?;
        Ok(())
    }

    async fn start_run(&self, session_id: &str, assistant_id: &str) -> Result<Run, LlmError> {
        let request = self
            .client
            .post(self.api_url(&format!("threads/{}/runs", session_id)))
            .json(&CreateRunRequest { assistant_id });
        self.execute(request).await
    }

    async fn get_run(&self, session_id: &str, run_id: &str) -> Result<Run, LlmError> {
        let url = self.api_url(&format!("threads/{}/runs/{}", session_id, run_id));
        self.execute_get(&url, &[]).await
    }

    async fn list_messages(
        &self,
        session_id: &str,
        order: SortOrder,
        limit: u32,
    ) -> Result<Vec<ThreadMessage>, LlmError> {
        let url = self.api_url(&format!("threads/{}/messages", session_id));
        let query = [
            ("order", order.as_str().to_string()),
            ("limit", limit.to_string()),
        ];
        let list: MessageList = self.execute_get(&url, &query).await?;
        Ok(list.data)
    }

    fn name(&self) -> &str {
        "openai-assistants"
    }
}
