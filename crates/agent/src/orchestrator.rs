//! Turn orchestrator
//!
//! Sequences the providers for one client request:
//!
//! ```text
//! audio turn:  stage -> transcribe -+
//!                                   +-> resolve session -> run -> [synthesize] -> envelope
//! text turn:   validate ------------+
//! ```
//!
//! Every failure ends the turn with a `ResponseEnvelope` built from a closed
//! `TurnError` kind. A panic inside a turn is caught here and reported as
//! `Error: <description>`.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use voice_turn_config::Settings;
use voice_turn_core::{SpeechToText, TextToSpeech};
use voice_turn_llm::{AssistantBackend, ConversationSession, RunPoller};
use voice_turn_pipeline::{AudioStagingArea, AudioUpload, SpeechSynthesizer, Transcriber};

use crate::envelope::ResponseEnvelope;
use crate::error::TurnError;

/// Composes staging, transcription, the agent and synthesis into turns
#[derive(Clone)]
pub struct TurnOrchestrator {
    staging: AudioStagingArea,
    transcriber: Transcriber,
    session: ConversationSession,
    poller: RunPoller,
    synthesizer: SpeechSynthesizer,
}

impl TurnOrchestrator {
    pub fn new(
        staging: AudioStagingArea,
        transcriber: Transcriber,
        session: ConversationSession,
        poller: RunPoller,
        synthesizer: SpeechSynthesizer,
    ) -> Self {
        Self {
            staging,
            transcriber,
            session,
            poller,
            synthesizer,
        }
    }

    /// Wire the adapters around long-lived provider handles
    pub fn from_settings(
        settings: &Settings,
        stt: Arc<dyn SpeechToText>,
        assistant: Arc<dyn AssistantBackend>,
        tts: Arc<dyn TextToSpeech>,
    ) -> Self {
        Self::new(
            AudioStagingArea::from_config(&settings.staging),
            Transcriber::from_config(stt, &settings.stt),
            ConversationSession::new(assistant.clone()),
            RunPoller::from_config(assistant, &settings.assistant),
            SpeechSynthesizer::from_config(tts, &settings.tts),
        )
    }

    pub fn staging(&self) -> &AudioStagingArea {
        &self.staging
    }

    /// Forward typed text to the agent
    pub async fn text_turn(
        &self,
        text: &str,
        session_id: Option<&str>,
        wants_audio: bool,
    ) -> ResponseEnvelope {
        self.guarded("text_turn", async {
            if text.trim().is_empty() {
                return Err(TurnError::InvalidInput("No text provided".to_string()));
            }
            self.converse(text, session_id, wants_audio).await
        })
        .await
    }

    /// Transcribe an uploaded recording and forward it to the agent
    pub async fn audio_turn(
        &self,
        upload: &dyn AudioUpload,
        session_id: Option<&str>,
        wants_audio: bool,
    ) -> ResponseEnvelope {
        self.guarded("audio_turn", async {
            let staged = self.staging.stage(upload).await.map_err(TurnError::Staging)?;

            let utterance = self
                .transcriber
                .transcribe(&staged.bytes, staged.format)
                .await
                .map_err(TurnError::Transcription)?;

            tracing::debug!(utterance = %utterance, "Transcribed upload");

            self.converse(&utterance, session_id, wants_audio).await
        })
        .await
    }

    /// Shared tail of both turns: agent exchange then optional synthesis
    async fn converse(
        &self,
        utterance: &str,
        session_id: Option<&str>,
        wants_audio: bool,
    ) -> Result<ResponseEnvelope, TurnError> {
        let session_id = self.session.resolve(session_id).await?;
        let reply = self.poller.run_turn(&session_id, utterance).await?;

        let envelope = ResponseEnvelope::success(reply, session_id);
        if !wants_audio {
            return Ok(envelope);
        }

        match self.synthesizer.synthesize(&envelope.message).await {
            Some(audio) => Ok(envelope.with_audio(audio)),
            None => Err(TurnError::Synthesis),
        }
    }

    /// Run a turn and convert every outcome, panics included, to an envelope
    async fn guarded<F>(&self, operation: &'static str, turn: F) -> ResponseEnvelope
    where
        F: Future<Output = Result<ResponseEnvelope, TurnError>>,
    {
        let start = Instant::now();

        match AssertUnwindSafe(turn).catch_unwind().await {
            Ok(Ok(envelope)) => {
                tracing::info!(
                    operation,
                    session_id = envelope.session_id.as_deref().unwrap_or_default(),
                    audio = envelope.audio.is_some(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Turn completed"
                );
                envelope
            },
            Ok(Err(e)) => {
                tracing::error!(
                    operation,
                    kind = e.kind(),
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Turn failed"
                );
                ResponseEnvelope::failure(e.message())
            },
            Err(panic) => {
                let description = panic_description(panic.as_ref());
                tracing::error!(operation, panic = %description, "Turn panicked");
                ResponseEnvelope::failure(format!("Error: {}", description))
            },
        }
    }
}

fn panic_description(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected failure".to_string()
    }
}
