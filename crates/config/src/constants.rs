//! Centralized defaults for provider endpoints, models and timings
//!
//! Use these instead of repeating literals in backends and tests.

/// Provider API endpoints
pub mod endpoints {
    /// Deepgram REST API
    pub const DEEPGRAM_DEFAULT: &str = "https://api.deepgram.com";

    /// OpenAI REST API (Assistants live under /v1)
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com";

    /// ElevenLabs REST API
    pub const ELEVENLABS_DEFAULT: &str = "https://api.elevenlabs.io";
}

/// Environment variables holding provider credentials
pub mod env_keys {
    pub const DEEPGRAM_API_KEY: &str = "DEEPGRAM_API_KEY";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const ASSISTANT_ID: &str = "ASSISTANT_ID_KEY";
    pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
}

/// Model and voice defaults
pub mod models {
    /// Deepgram recognition model
    pub const STT_MODEL: &str = "nova-2";

    /// ElevenLabs synthesis model
    pub const TTS_MODEL: &str = "eleven_turbo_v2";

    /// ElevenLabs premade voice "Charlie"
    pub const TTS_VOICE_ID: &str = "IKne3meq5aSn9XLyUdCD";
}

/// Timeouts (in milliseconds)
pub mod timeouts {
    /// STT request timeout
    pub const STT_TIMEOUT_MS: u64 = 30_000;

    /// Single assistant API request timeout
    pub const ASSISTANT_REQUEST_MS: u64 = 30_000;

    /// TTS synthesis timeout, including stream consumption
    pub const TTS_TIMEOUT_MS: u64 = 30_000;
}

/// Run polling
pub mod polling {
    /// Delay between run status checks
    pub const INTERVAL_MS: u64 = 500;

    /// Status checks before giving up
    pub const MAX_ATTEMPTS: u32 = 240;

    /// Overall wall-clock budget for one run
    pub const TIMEOUT_MS: u64 = 120_000;
}

/// Upload limits
pub mod limits {
    /// Largest accepted request body (audio uploads included)
    pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
}
