//! Console output of a turn.
//!
//! The pipeline and the prompt loop report through [`TurnSink`] so tests can
//! collect exactly what a user would have seen.

use crate::defaults::BUSY_NOTICE;
use crate::error::LingoError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Something worth showing the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Transcript(String),
    Chunk(String),
    Translation(String),
    AudioSaved(PathBuf),
    Error(String),
    Busy,
}

impl SinkEvent {
    /// The console line for this event.
    pub fn render(&self) -> String {
        match self {
            SinkEvent::Transcript(text) => format!("Transcribed: {text}"),
            SinkEvent::Chunk(text) => format!("AI:  {text}"),
            SinkEvent::Translation(text) => format!("Translated AI:  {text}"),
            SinkEvent::AudioSaved(path) => {
                format!("Translated speech saved to {}", path.display())
            }
            SinkEvent::Error(message) => format!("Error: {message}"),
            SinkEvent::Busy => BUSY_NOTICE.to_string(),
        }
    }

    /// Whether the event belongs on the error stream.
    pub fn is_error(&self) -> bool {
        matches!(self, SinkEvent::Error(_))
    }
}

/// Pluggable output handler for conversation turns.
pub trait TurnSink: Send + Sync {
    fn emit(&self, event: SinkEvent);

    fn transcript(&self, text: &str) {
        self.emit(SinkEvent::Transcript(text.to_string()));
    }

    fn chunk(&self, text: &str) {
        self.emit(SinkEvent::Chunk(text.to_string()));
    }

    fn translation(&self, text: &str) {
        self.emit(SinkEvent::Translation(text.to_string()));
    }

    fn audio_saved(&self, path: &Path) {
        self.emit(SinkEvent::AudioSaved(path.to_path_buf()));
    }

    fn error(&self, error: &LingoError) {
        self.emit(SinkEvent::Error(error.to_string()));
    }

    fn busy(&self) {
        self.emit(SinkEvent::Busy);
    }
}

/// Writes events to stdout, errors to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl TurnSink for StdoutSink {
    fn emit(&self, event: SinkEvent) {
        if event.is_error() {
            eprintln!("{}", event.render());
        } else {
            println!("{}", event.render());
        }
    }
}

/// Sink that collects all events (for tests and embedding).
#[derive(Debug, Default)]
pub struct CollectorSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events rendered as console lines.
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(SinkEvent::render).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl TurnSink for CollectorSink {
    fn emit(&self, event: SinkEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl<T: TurnSink + ?Sized> TurnSink for std::sync::Arc<T> {
    fn emit(&self, event: SinkEvent) {
        (**self).emit(event)
    }
}
