//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{endpoints, env_keys, limits, models, polling, timeouts};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Speech-to-text provider
    #[serde(default)]
    pub stt: SttConfig,

    /// Conversational agent provider
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Text-to-speech provider
    #[serde(default)]
    pub tts: TtsConfig,

    /// Upload staging
    #[serde(default)]
    pub staging: StagingConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn env_or_default(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

fn default_true() -> bool {
    true
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> usize {
    limits::MAX_UPLOAD_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Speech-to-text provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    /// API base URL
    #[serde(default = "default_stt_endpoint")]
    pub endpoint: String,

    /// API key (defaults to DEEPGRAM_API_KEY)
    #[serde(default = "default_stt_api_key")]
    pub api_key: String,

    /// Recognition model
    #[serde(default = "default_stt_model")]
    pub model: String,

    /// Punctuation and number formatting
    #[serde(default = "default_true")]
    pub smart_format: bool,

    /// Request timeout in milliseconds
    #[serde(default = "default_stt_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_stt_endpoint() -> String {
    endpoints::DEEPGRAM_DEFAULT.to_string()
}

fn default_stt_api_key() -> String {
    env_or_default(env_keys::DEEPGRAM_API_KEY)
}

fn default_stt_model() -> String {
    models::STT_MODEL.to_string()
}

fn default_stt_timeout_ms() -> u64 {
    timeouts::STT_TIMEOUT_MS
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            endpoint: default_stt_endpoint(),
            api_key: default_stt_api_key(),
            model: default_stt_model(),
            smart_format: true,
            timeout_ms: default_stt_timeout_ms(),
        }
    }
}

/// Conversational agent provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// API base URL
    #[serde(default = "default_assistant_endpoint")]
    pub endpoint: String,

    /// API key (defaults to OPENAI_API_KEY)
    #[serde(default = "default_assistant_api_key")]
    pub api_key: String,

    /// Agent to run against each session (defaults to ASSISTANT_ID_KEY)
    #[serde(default = "default_assistant_id")]
    pub assistant_id: String,

    /// Single request timeout in milliseconds
    #[serde(default = "default_assistant_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Retries for idempotent reads (run status, message listing)
    #[serde(default = "default_assistant_max_retries")]
    pub max_retries: u32,

    /// Delay between run status checks in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Status checks before a run is abandoned
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Wall-clock budget for one run in milliseconds
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

fn default_assistant_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}

fn default_assistant_api_key() -> String {
    env_or_default(env_keys::OPENAI_API_KEY)
}

fn default_assistant_id() -> String {
    env_or_default(env_keys::ASSISTANT_ID)
}

fn default_assistant_request_timeout_ms() -> u64 {
    timeouts::ASSISTANT_REQUEST_MS
}

fn default_assistant_max_retries() -> u32 {
    2
}

fn default_poll_interval_ms() -> u64 {
    polling::INTERVAL_MS
}

fn default_max_poll_attempts() -> u32 {
    polling::MAX_ATTEMPTS
}

fn default_poll_timeout_ms() -> u64 {
    polling::TIMEOUT_MS
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: default_assistant_endpoint(),
            api_key: default_assistant_api_key(),
            assistant_id: default_assistant_id(),
            request_timeout_ms: default_assistant_request_timeout_ms(),
            max_retries: default_assistant_max_retries(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

impl AssistantConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

/// Text-to-speech provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// API base URL
    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,

    /// API key (defaults to ELEVENLABS_API_KEY)
    #[serde(default = "default_tts_api_key")]
    pub api_key: String,

    /// Default voice
    #[serde(default = "default_tts_voice_id")]
    pub voice_id: String,

    /// Default synthesis model
    #[serde(default = "default_tts_model")]
    pub model: String,

    /// Timeout in milliseconds, covering the whole audio stream
    #[serde(default = "default_tts_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_tts_endpoint() -> String {
    endpoints::ELEVENLABS_DEFAULT.to_string()
}

fn default_tts_api_key() -> String {
    env_or_default(env_keys::ELEVENLABS_API_KEY)
}

fn default_tts_voice_id() -> String {
    models::TTS_VOICE_ID.to_string()
}

fn default_tts_model() -> String {
    models::TTS_MODEL.to_string()
}

fn default_tts_timeout_ms() -> u64 {
    timeouts::TTS_TIMEOUT_MS
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_tts_endpoint(),
            api_key: default_tts_api_key(),
            voice_id: default_tts_voice_id(),
            model: default_tts_model(),
            timeout_ms: default_tts_timeout_ms(),
        }
    }
}

/// Upload staging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Directory for staged uploads (OS temp dir when unset)
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// File name prefix for staged uploads
    #[serde(default = "default_staging_prefix")]
    pub file_prefix: String,
}

fn default_staging_prefix() -> String {
    "voice-turn-".to_string()
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: default_staging_prefix(),
        }
    }
}

impl StagingConfig {
    /// Directory staged files are written to
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_assistant()?;
        self.validate_timeouts()?;
        self.validate_credentials()?;

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_upload_bytes".to_string(),
                message: "Upload limit must be at least 1 byte".to_string(),
            });
        }

        Ok(())
    }

    fn validate_assistant(&self) -> Result<(), ConfigError> {
        let assistant = &self.assistant;

        if assistant.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "assistant.poll_interval_ms".to_string(),
                message: "Poll interval must be at least 1ms".to_string(),
            });
        }

        if assistant.max_poll_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "assistant.max_poll_attempts".to_string(),
                message: "At least one status check is required".to_string(),
            });
        }

        if assistant.poll_timeout_ms < assistant.poll_interval_ms {
            return Err(ConfigError::InvalidValue {
                field: "assistant.poll_timeout_ms".to_string(),
                message: format!(
                    "Must be at least the poll interval ({}ms), got {}ms",
                    assistant.poll_interval_ms, assistant.poll_timeout_ms
                ),
            });
        }

        Ok(())
    }

    fn validate_timeouts(&self) -> Result<(), ConfigError> {
        let checks = [
            ("stt.timeout_ms", self.stt.timeout_ms),
            ("assistant.request_timeout_ms", self.assistant.request_timeout_ms),
            ("tts.timeout_ms", self.tts.timeout_ms),
        ];

        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Timeout must be at least 1ms".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Missing credentials are fatal in staging/production and a warning otherwise
    fn validate_credentials(&self) -> Result<(), ConfigError> {
        for field in self.missing_credentials() {
            if self.environment.is_strict() {
                return Err(ConfigError::MissingField(field.to_string()));
            }
            tracing::warn!(field, "Provider credential not configured");
        }

        Ok(())
    }

    /// Credential fields that are still empty
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.stt.api_key.trim().is_empty() {
            missing.push("stt.api_key");
        }
        if self.assistant.api_key.trim().is_empty() {
            missing.push("assistant.api_key");
        }
        if self.assistant.assistant_id.trim().is_empty() {
            missing.push("assistant.assistant_id");
        }
        if self.tts.api_key.trim().is_empty() {
            missing.push("tts.api_key");
        }
        missing
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.* > config/default.* > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    // A missing .env file is normal outside local development
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(ConfigError::Environment(e.to_string()));
        }
    }

    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("VOICE_TURN")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
