//! Audio container formats

use serde::{Deserialize, Serialize};

/// Container formats accepted from clients and produced by synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Ogg (Opus or Vorbis), what browser recorders emit by default
    #[default]
    Ogg,
    /// WebM/Opus
    Webm,
    /// RIFF WAV
    Wav,
    /// MPEG layer 3
    Mp3,
    /// Anything else; forwarded to providers as an opaque byte stream
    Unknown,
}

impl AudioFormat {
    /// MIME type sent to providers
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Webm => "audio/webm",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Unknown => "application/octet-stream",
        }
    }

    /// File extension used for staged files
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Ogg => "ogg",
            AudioFormat::Webm => "webm",
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Unknown => "bin",
        }
    }

    /// Resolve a format from a MIME type such as `audio/webm;codecs=opus`
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "audio/ogg" | "application/ogg" | "audio/opus" => AudioFormat::Ogg,
            "audio/webm" | "video/webm" => AudioFormat::Webm,
            "audio/wav" | "audio/x-wav" | "audio/wave" => AudioFormat::Wav,
            "audio/mpeg" | "audio/mp3" => AudioFormat::Mp3,
            _ => AudioFormat::Unknown,
        }
    }

    /// Resolve a format from a file name extension
    pub fn from_filename(name: &str) -> Self {
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return AudioFormat::Unknown,
        };

        match ext.as_str() {
            "ogg" | "oga" | "opus" => AudioFormat::Ogg,
            "webm" => AudioFormat::Webm,
            "wav" => AudioFormat::Wav,
            "mp3" => AudioFormat::Mp3,
            _ => AudioFormat::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime_ignores_parameters() {
        assert_eq!(AudioFormat::from_mime("audio/webm;codecs=opus"), AudioFormat::Webm);
        assert_eq!(AudioFormat::from_mime("Audio/OGG"), AudioFormat::Ogg);
        assert_eq!(AudioFormat::from_mime("text/plain"), AudioFormat::Unknown);
    }

    #[test]
    fn test_from_filename() {
        assert_eq!(AudioFormat::from_filename("recording.ogg"), AudioFormat::Ogg);
        assert_eq!(AudioFormat::from_filename("clip.WAV"), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_filename("blob"), AudioFormat::Unknown);
    }

    #[test]
    fn test_extension_matches_mime() {
        for format in [AudioFormat::Ogg, AudioFormat::Webm, AudioFormat::Wav, AudioFormat::Mp3] {
            assert_eq!(AudioFormat::from_mime(format.mime_type()), format);
            assert_eq!(
                AudioFormat::from_filename(&format!("x.{}", format.extension())),
                format
            );
        }
    }
}
