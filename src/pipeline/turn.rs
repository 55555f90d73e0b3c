//! One conversation turn: transcribe, chat, translate, synthesize.

use crate::chat::ChatModel;
use crate::config::EmptyTranscriptPolicy;
use crate::error::{LingoError, Result, Stage};
use crate::pipeline::sink::TurnSink;
use crate::pipeline::types::{StageTiming, TurnInput, TurnOutput};
use crate::stt::Transcriber;
use crate::translate::Translator;
use crate::tts::SpeechSynthesizer;
use futures_util::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

struct Synthesis {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    output_path: PathBuf,
}

/// Runs the stages of a turn strictly in order.
///
/// The first failing stage aborts the turn; later stages never run.
pub struct TurnPipeline {
    transcriber: Option<Arc<dyn Transcriber>>,
    empty_transcript: EmptyTranscriptPolicy,
    chat: Arc<dyn ChatModel>,
    translator: Arc<dyn Translator>,
    target_language: String,
    synthesis: Option<Synthesis>,
}

impl TurnPipeline {
    /// A text-variant pipeline (chat + translate).
    pub fn new(
        chat: Arc<dyn ChatModel>,
        translator: Arc<dyn Translator>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            transcriber: None,
            empty_transcript: EmptyTranscriptPolicy::default(),
            chat,
            translator,
            target_language: target_language.into(),
            synthesis: None,
        }
    }

    /// Transcribe audio input before chatting.
    pub fn with_transcriber(
        mut self,
        transcriber: Arc<dyn Transcriber>,
        empty_transcript: EmptyTranscriptPolicy,
    ) -> Self {
        self.transcriber = Some(transcriber);
        self.empty_transcript = empty_transcript;
        self
    }

    /// Synthesize the translation and overwrite `output_path` with the audio.
    pub fn with_synthesizer(
        mut self,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        self.synthesis = Some(Synthesis {
            synthesizer,
            output_path: output_path.into(),
        });
        self
    }

    pub fn has_transcriber(&self) -> bool {
        self.transcriber.is_some()
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub async fn run(&self, input: TurnInput, sink: &dyn TurnSink) -> Result<TurnOutput> {
        let mut timings = Vec::with_capacity(Stage::ALL.len());

        let message = match (input.audio, &self.transcriber) {
            (Some(audio), Some(transcriber)) => {
                let started = Instant::now();
                let transcript = transcriber.transcribe(&audio).await?;
                timings.push(timing(Stage::Transcribe, started));

                if transcript.is_empty() {
                    match self.empty_transcript {
                        EmptyTranscriptPolicy::Abort => {
                            return Err(LingoError::Transcription {
                                message: "no speech recognized".to_string(),
                            });
                        }
                        EmptyTranscriptPolicy::Proceed => {
                            tracing::warn!("empty transcript, sending empty message to chat");
                        }
                    }
                }
                sink.transcript(&transcript);
                transcript
            }
            _ => input.text,
        };

        let started = Instant::now();
        let mut stream = self.chat.send_message_stream(&message).await?;
        let mut response = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            sink.chunk(&chunk);
            response.push_str(&chunk);
        }
        drop(stream);
        self.chat.complete_exchange(&message, &response);
        timings.push(timing(Stage::Chat, started));
        tracing::debug!(
            model = self.chat.name(),
            chars = response.len(),
            "chat response complete"
        );

        let started = Instant::now();
        let translated = self
            .translator
            .translate(&response, &self.target_language)
            .await?;
        timings.push(timing(Stage::Translate, started));
        sink.translation(&translated);

        let audio_path = match &self.synthesis {
            Some(synthesis) => {
                let started = Instant::now();
                let audio = synthesis.synthesizer.synthesize(&translated).await?;
                tokio::fs::write(&synthesis.output_path, &audio)
                    .await
                    .map_err(|e| LingoError::Synthesis {
                        message: format!(
                            "failed to write {}: {}",
                            synthesis.output_path.display(),
                            e
                        ),
                    })?;
                timings.push(timing(Stage::Synthesize, started));
                sink.audio_saved(&synthesis.output_path);
                Some(synthesis.output_path.clone())
            }
            None => None,
        };

        Ok(TurnOutput {
            message,
            response,
            translated,
            audio_path,
            timings,
        })
    }
}

fn timing(stage: Stage, started: Instant) -> StageTiming {
    let elapsed = started.elapsed();
    tracing::debug!(stage = %stage, elapsed_ms = elapsed.as_millis() as u64, "stage done");
    StageTiming { stage, elapsed }
}
