//! Uniform response envelope

use serde::{Deserialize, Serialize};

/// Outcome of one turn, as returned to the client
///
/// `response == true` always carries the agent's reply in `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub response: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(reply: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            response: true,
            message: reply.into(),
            session_id: Some(session_id.into()),
            audio: None,
        }
    }

    pub fn with_audio(mut self, audio: impl Into<String>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            response: false,
            message: message.into(),
            session_id: None,
            audio: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_omits_audio_key() {
        let json = serde_json::to_value(ResponseEnvelope::success("Hi!", "thread_1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "response": true, "message": "Hi!", "session_id": "thread_1" })
        );
    }

    #[test]
    fn test_success_with_audio() {
        let envelope = ResponseEnvelope::success("Hi!", "thread_1").with_audio("AAEC");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["audio"], "AAEC");
        assert!(envelope.is_success());
    }

    #[test]
    fn test_failure_has_only_two_keys() {
        let json = serde_json::to_value(ResponseEnvelope::failure("Failed to generate audio")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "response": false, "message": "Failed to generate audio" })
        );
    }
}
