//! Per-turn values. Nothing here outlives a turn.

use crate::error::Stage;
use std::path::PathBuf;
use std::time::Duration;

/// What the user supplied for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnInput {
    /// The typed line.
    pub text: String,
    /// LINEAR16 audio to transcribe instead of using `text` (speech variant).
    pub audio: Option<Vec<u8>>,
}

impl TurnInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            audio: None,
        }
    }

    pub fn audio(audio: Vec<u8>) -> Self {
        Self {
            text: String::new(),
            audio: Some(audio),
        }
    }
}

/// Wall-clock time spent in one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: Stage,
    pub elapsed: Duration,
}

/// Everything a successful turn produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnOutput {
    /// The message actually sent to the chat stage.
    pub message: String,
    /// Chat chunks concatenated in arrival order.
    pub response: String,
    pub translated: String,
    /// Where synthesized speech was written, if the synthesis stage ran.
    pub audio_path: Option<PathBuf>,
    pub timings: Vec<StageTiming>,
}

impl TurnOutput {
    /// Total time across all stages.
    pub fn total_elapsed(&self) -> Duration {
        self.timings.iter().map(|t| t.elapsed).sum()
    }
}
