//! Integration tests for the turn flow (staging -> STT -> agent -> TTS)
//!
//! All three providers are in-memory fakes that record their calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use voice_turn_agent::{ResponseEnvelope, TurnOrchestrator};
use voice_turn_core::{
    AudioFormat, AudioStream, Error, Result, SpeechToText, SynthesisRequest, TextToSpeech,
    TranscriptionOptions, TranscriptionResult,
};
use voice_turn_llm::{
    AssistantBackend, ConversationSession, LlmError, MessageContent, MessageRole, PollConfig, Run,
    RunPoller, RunStatus, SortOrder, ThreadMessage,
};
use voice_turn_llm::backend::TextValue;
use voice_turn_pipeline::{AudioStagingArea, AudioUpload, SpeechSynthesizer, Transcriber, UploadedAudio};

const OGG_MAGIC: &[u8] = b"OggS";

/// Returns a fixed transcript for Ogg input and rejects anything else
struct FakeStt {
    transcript: String,
    calls: Mutex<u32>,
}

impl FakeStt {
    fn new(transcript: &str) -> Arc<Self> {
        Arc::new(Self {
            transcript: transcript.to_string(),
            calls: Mutex::new(0),
        })
    }
}

#[async_trait]
impl SpeechToText for FakeStt {
    async fn transcribe(
        &self,
        audio: &[u8],
        _format: AudioFormat,
        _options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult> {
        *self.calls.lock() += 1;
        if !audio.starts_with(OGG_MAGIC) {
            return Err(Error::Stt("corrupt or unsupported data".to_string()));
        }
        Ok(TranscriptionResult::single(self.transcript.clone(), 0.98))
    }

    fn model_name(&self) -> &str {
        "fake-stt"
    }
}

/// Sessions, messages and runs held in memory; runs pass through
/// `queued` and `in_progress` before completing with an echo reply
#[derive(Default)]
struct FakeAssistant {
    sessions: Mutex<Vec<String>>,
    messages: Mutex<Vec<(String, MessageRole, String)>>,
    polls: Mutex<u32>,
    final_status: Mutex<Option<&'static str>>,
}

impl FakeAssistant {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn failing_runs(status: &'static str) -> Arc<Self> {
        let assistant = Self::default();
        *assistant.final_status.lock() = Some(status);
        Arc::new(assistant)
    }

    fn user_messages(&self, session_id: &str) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(s, role, _)| s == session_id && *role == MessageRole::User)
            .map(|(_, _, text)| text.clone())
            .collect()
    }

    fn message_count(&self) -> usize {
        self.messages.lock().len()
    }
}

#[async_trait]
impl AssistantBackend for FakeAssistant {
    async fn create_session(&self) -> std::result::Result<String, LlmError> {
        let mut sessions = self.sessions.lock();
        let id = format!("thread_{}", sessions.len() + 1);
        sessions.push(id.clone());
        Ok(id)
    }

    async fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> std::result::Result<(), LlmError> {
        if !self.sessions.lock().iter().any(|s| s == session_id) {
            return Err(LlmError::Api(format!("No thread found with id '{}'", session_id)));
        }
        self.messages
            .lock()
            .push((session_id.to_string(), role, content.to_string()));
        Ok(())
    }

    async fn start_run(&self, session_id: &str, _assistant_id: &str) -> std::result::Result<Run, LlmError> {
        Ok(Run {
            id: format!("run_{}", session_id),
            status: RunStatus::Queued,
        })
    }

    async fn get_run(&self, session_id: &str, run_id: &str) -> std::result::Result<Run, LlmError> {
        let mut polls = self.polls.lock();
        *polls += 1;

        let status = if *polls % 2 == 1 {
            RunStatus::InProgress
        } else {
            match *self.final_status.lock() {
                Some(status) => RunStatus::from(status),
                None => {
                    let last = self.user_messages(session_id).pop().unwrap_or_default();
                    self.messages.lock().push((
                        session_id.to_string(),
                        MessageRole::Assistant,
                        format!("You said: {}", last),
                    ));
                    RunStatus::Completed
                },
            }
        };

        Ok(Run {
            id: run_id.to_string(),
            status,
        })
    }

    async fn list_messages(
        &self,
        session_id: &str,
        order: SortOrder,
        limit: u32,
    ) -> std::result::Result<Vec<ThreadMessage>, LlmError> {
        let mut messages: Vec<ThreadMessage> = self
            .messages
            .lock()
            .iter()
            .filter(|(s, _, _)| s == session_id)
            .map(|(_, role, text)| ThreadMessage {
                id: String::new(),
                role: *role,
                content: vec![MessageContent::Text {
                    text: TextValue { value: text.clone() },
                }],
            })
            .collect();
        if order == SortOrder::Desc {
            messages.reverse();
        }
        messages.truncate(limit as usize);
        Ok(messages)
    }

    fn name(&self) -> &str {
        "fake-assistant"
    }
}

/// Emits fixed audio bytes, or fails when unavailable
struct FakeTts {
    available: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeTts {
    fn new(available: bool) -> Arc<Self> {
        Arc::new(Self {
            available,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextToSpeech for FakeTts {
    async fn synthesize(&self, request: SynthesisRequest<'_>) -> Result<AudioStream> {
        self.calls.lock().push(request.text.to_string());
        if !self.available {
            return Err(Error::Network("synthesis provider unreachable".to_string()));
        }
        let chunks: Vec<Result<Vec<u8>>> = vec![Ok(vec![0x49, 0x44]), Ok(vec![0x33])];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    fn model_name(&self) -> &str {
        "fake-tts"
    }
}

/// Upload that cannot be written anywhere
struct UnsavableUpload;

#[async_trait]
impl AudioUpload for UnsavableUpload {
    async fn save_to(&self, _path: &Path) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only upload"))
    }

    fn format(&self) -> AudioFormat {
        AudioFormat::Ogg
    }
}

struct Harness {
    orchestrator: TurnOrchestrator,
    stt: Arc<FakeStt>,
    assistant: Arc<FakeAssistant>,
    tts: Arc<FakeTts>,
    staging_dir: TempDir,
}

impl Harness {
    fn new(transcript: &str, assistant: Arc<FakeAssistant>, tts_available: bool) -> Self {
        let staging_dir = TempDir::new().unwrap();
        let stt = FakeStt::new(transcript);
        let tts = FakeTts::new(tts_available);

        let poll = PollConfig {
            interval: Duration::from_millis(1),
            max_attempts: 10,
            timeout: Duration::from_secs(5),
        };

        let orchestrator = TurnOrchestrator::new(
            AudioStagingArea::new(staging_dir.path(), "turn-"),
            Transcriber::new(stt.clone(), TranscriptionOptions::default()),
            ConversationSession::new(assistant.clone()),
            RunPoller::new(assistant.clone(), "asst_test", poll),
            SpeechSynthesizer::new(tts.clone(), "voice", "model", Duration::from_secs(1)),
        );

        Self {
            orchestrator,
            stt,
            assistant,
            tts,
            staging_dir,
        }
    }

    fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path()).unwrap().count()
    }
}

fn ogg_upload() -> UploadedAudio {
    let mut bytes = OGG_MAGIC.to_vec();
    bytes.extend_from_slice(&[0u8; 64]);
    UploadedAudio::new(bytes, Some("audio/ogg; codecs=opus"), Some("recording.ogg".to_string()))
}

#[tokio::test]
async fn test_text_turn_without_session_creates_one() {
    let harness = Harness::new("", FakeAssistant::new(), true);

    let envelope = harness.orchestrator.text_turn("Hello", None, false).await;

    assert_eq!(
        envelope,
        ResponseEnvelope {
            response: true,
            message: "You said: Hello".to_string(),
            session_id: Some("thread_1".to_string()),
            audio: None,
        }
    );
    let json = serde_json::to_value(&envelope).unwrap();
    assert!(json.get("audio").is_none());
}

#[tokio::test]
async fn test_text_only_turn_never_calls_synthesis() {
    let harness = Harness::new("", FakeAssistant::new(), true);

    harness.orchestrator.text_turn("Hello", None, false).await;
    harness
        .orchestrator
        .audio_turn(&ogg_upload(), None, false)
        .await;

    assert!(harness.tts.calls.lock().is_empty());
}

#[tokio::test]
async fn test_session_continuity_across_turns() {
    let harness = Harness::new("", FakeAssistant::new(), true);

    let first = harness.orchestrator.text_turn("first", None, false).await;
    let session_id = first.session_id.clone().unwrap();
    let second = harness
        .orchestrator
        .text_turn("second", Some(&session_id), false)
        .await;

    assert!(second.response);
    assert_eq!(second.session_id.as_deref(), Some(session_id.as_str()));
    assert_eq!(second.message, "You said: second");
    assert_eq!(harness.assistant.sessions.lock().len(), 1);
    assert_eq!(
        harness.assistant.user_messages(&session_id),
        vec!["first".to_string(), "second".to_string()]
    );
}

#[tokio::test]
async fn test_text_is_forwarded_as_typed() {
    let harness = Harness::new("", FakeAssistant::new(), true);

    let envelope = harness.orchestrator.text_turn("  Hello  ", None, false).await;

    assert!(envelope.response);
    assert_eq!(envelope.message, "You said:   Hello  ");
    let session_id = envelope.session_id.unwrap();
    assert_eq!(
        harness.assistant.user_messages(&session_id),
        vec!["  Hello  ".to_string()]
    );
}

#[tokio::test]
async fn test_fresh_sessions_are_distinct() {
    let harness = Harness::new("", FakeAssistant::new(), true);

    let a = harness.orchestrator.text_turn("one", None, false).await;
    let b = harness.orchestrator.text_turn("two", Some("  "), false).await;

    assert_ne!(a.session_id, b.session_id);
    assert_eq!(harness.assistant.sessions.lock().len(), 2);
}

#[tokio::test]
async fn test_audio_requested_and_synthesized() {
    let harness = Harness::new("", FakeAssistant::new(), true);

    let envelope = harness.orchestrator.text_turn("Hello", None, true).await;

    assert!(envelope.response);
    assert_eq!(envelope.audio.as_deref(), Some("SUQz"));
    assert_eq!(harness.tts.calls.lock().as_slice(), &["You said: Hello".to_string()]);
}

#[tokio::test]
async fn test_synthesis_unavailable_fails_the_turn() {
    let harness = Harness::new("", FakeAssistant::new(), false);

    let envelope = harness.orchestrator.text_turn("Hello", None, true).await;

    assert_eq!(envelope, ResponseEnvelope::failure("Failed to generate audio"));
    // The agent still answered; only the audio is missing
    assert_eq!(harness.assistant.message_count(), 2);
}

#[tokio::test]
async fn test_blank_text_is_rejected() {
    let harness = Harness::new("", FakeAssistant::new(), true);

    let envelope = harness.orchestrator.text_turn("   ", None, false).await;

    assert!(!envelope.response);
    assert!(envelope.message.starts_with("Error: "));
    assert!(harness.assistant.sessions.lock().is_empty());
}

#[tokio::test]
async fn test_audio_turn_success() {
    let harness = Harness::new("What's the weather?", FakeAssistant::new(), true);

    let envelope = harness
        .orchestrator
        .audio_turn(&ogg_upload(), None, true)
        .await;

    assert!(envelope.response);
    assert_eq!(envelope.message, "You said: What's the weather?");
    assert!(envelope.audio.is_some());
    assert_eq!(harness.staged_files(), 0);
}

#[tokio::test]
async fn test_blank_transcript_never_reaches_agent() {
    for transcript in ["", "   ", "\n\t"] {
        let harness = Harness::new(transcript, FakeAssistant::new(), true);

        let envelope = harness
            .orchestrator
            .audio_turn(&ogg_upload(), None, true)
            .await;

        assert_eq!(envelope, ResponseEnvelope::failure("Failed to generate transcript"));
        assert!(harness.assistant.sessions.lock().is_empty());
        assert_eq!(harness.assistant.message_count(), 0);
        assert!(harness.tts.calls.lock().is_empty());
        assert_eq!(harness.staged_files(), 0);
    }
}

#[tokio::test]
async fn test_corrupt_upload_fails_transcription() {
    let harness = Harness::new("ignored", FakeAssistant::new(), true);
    let upload = UploadedAudio::new(b"not audio".to_vec(), Some("audio/ogg"), None);

    let envelope = harness.orchestrator.audio_turn(&upload, None, false).await;

    assert_eq!(envelope, ResponseEnvelope::failure("Failed to generate transcript"));
    assert_eq!(*harness.stt.calls.lock(), 1);
    assert_eq!(harness.staged_files(), 0);
}

#[tokio::test]
async fn test_unsavable_upload_fails_staging() {
    let harness = Harness::new("ignored", FakeAssistant::new(), true);

    let envelope = harness
        .orchestrator
        .audio_turn(&UnsavableUpload, None, false)
        .await;

    assert_eq!(envelope, ResponseEnvelope::failure("Failed to generate transcript"));
    assert_eq!(*harness.stt.calls.lock(), 0);
    assert_eq!(harness.staged_files(), 0);
}

#[tokio::test]
async fn test_staging_cleared_after_agent_failure() {
    let harness = Harness::new("Hello", FakeAssistant::failing_runs("failed"), true);

    let envelope = harness
        .orchestrator
        .audio_turn(&ogg_upload(), None, true)
        .await;

    assert_eq!(envelope, ResponseEnvelope::failure("Error processing data"));
    assert_eq!(harness.staged_files(), 0);
}

#[tokio::test]
async fn test_failed_run_does_not_return_stale_reply() {
    let assistant = FakeAssistant::new();
    let harness = Harness::new("", assistant.clone(), true);

    let first = harness.orchestrator.text_turn("first", None, false).await;
    let session_id = first.session_id.unwrap();

    *assistant.final_status.lock() = Some("cancelled");
    let second = harness
        .orchestrator
        .text_turn("second", Some(&session_id), false)
        .await;

    assert_eq!(second, ResponseEnvelope::failure("Error processing data"));
}

#[tokio::test]
async fn test_unknown_session_is_an_agent_error() {
    let harness = Harness::new("", FakeAssistant::new(), true);

    let envelope = harness
        .orchestrator
        .text_turn("Hello", Some("thread_missing"), false)
        .await;

    assert_eq!(envelope, ResponseEnvelope::failure("Error processing data"));
}

#[tokio::test]
async fn test_stuck_run_times_out() {
    let harness = Harness::new("", FakeAssistant::failing_runs("in_progress"), true);

    let envelope = harness.orchestrator.text_turn("Hello", None, false).await;

    assert_eq!(
        envelope,
        ResponseEnvelope::failure("Timed out waiting for agent response")
    );
}
