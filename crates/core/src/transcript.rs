//! Transcript types

use serde::{Deserialize, Serialize};

/// Recognition profile sent with every transcription request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionOptions {
    /// Provider model name
    pub model: String,
    /// Punctuation, casing and number formatting
    pub smart_format: bool,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            model: "nova-2".to_string(),
            smart_format: true,
        }
    }
}

/// One candidate transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptAlternative {
    pub transcript: String,
    #[serde(default)]
    pub confidence: f32,
}

/// Transcription result, best alternative first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub alternatives: Vec<TranscriptAlternative>,
}

impl TranscriptionResult {
    /// Build a result holding a single alternative
    pub fn single(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            alternatives: vec![TranscriptAlternative {
                transcript: transcript.into(),
                confidence,
            }],
        }
    }

    /// Top alternative's text, if any
    pub fn best(&self) -> Option<&str> {
        self.alternatives.first().map(|a| a.transcript.as_str())
    }
}
