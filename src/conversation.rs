//! The prompt loop: read a line, run a turn, report, repeat.

use crate::audio::load_audio_file;
use crate::defaults::{AUDIO_LINE_PREFIX, EXIT_KEYWORD, PROMPT};
use crate::error::Result;
use crate::guard::SingleFlight;
use crate::input::LineSource;
use crate::pipeline::{TurnInput, TurnOutput, TurnPipeline, TurnSink};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

const BUSY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Where the loop is after one [`ConversationLoop::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Ready to prompt again.
    Idle,
    /// Another turn was in flight; nothing was read.
    Busy,
    /// Exit command or end of input. Terminal.
    Closed,
}

/// Turn counts for a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopSummary {
    pub turns_completed: usize,
    pub turns_failed: usize,
}

/// `true` if `line` is the exit command.
pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_KEYWORD)
}

/// Interactive conversation over a [`TurnPipeline`].
///
/// `step` takes `&self`, so one loop can be driven from several tasks; the
/// [`SingleFlight`] guard keeps turns from overlapping.
pub struct ConversationLoop {
    pipeline: TurnPipeline,
    guard: SingleFlight,
    sink: Arc<dyn TurnSink>,
    lines: Mutex<Box<dyn LineSource>>,
    audio_sample_rate: Option<u32>,
    closed: AtomicBool,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl ConversationLoop {
    pub fn new(
        pipeline: TurnPipeline,
        lines: impl LineSource + 'static,
        sink: Arc<dyn TurnSink>,
    ) -> Self {
        Self {
            pipeline,
            guard: SingleFlight::new(),
            sink,
            lines: Mutex::new(Box::new(lines)),
            audio_sample_rate: None,
            closed: AtomicBool::new(false),
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Treat `@<path>` lines as audio files, loaded at `sample_rate`.
    pub fn with_audio_files(mut self, sample_rate: u32) -> Self {
        self.audio_sample_rate = Some(sample_rate);
        self
    }

    /// Share an existing guard instead of a private one.
    pub fn with_guard(mut self, guard: SingleFlight) -> Self {
        self.guard = guard;
        self
    }

    pub fn guard(&self) -> &SingleFlight {
        &self.guard
    }

    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    pub fn summary(&self) -> LoopSummary {
        LoopSummary {
            turns_completed: self.completed.load(Ordering::SeqCst),
            turns_failed: self.failed.load(Ordering::SeqCst),
        }
    }

    /// One prompt cycle.
    pub async fn step(&self) -> LoopState {
        if self.closed.load(Ordering::SeqCst) {
            return LoopState::Closed;
        }
        if self.guard.is_busy() {
            self.sink.busy();
            return LoopState::Busy;
        }

        // Held for the whole turn so a waiting step prompts only afterwards.
        let mut lines = self.lines.lock().await;
        if self.closed.load(Ordering::SeqCst) {
            return LoopState::Closed;
        }

        let line = match lines.next_line(PROMPT).await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("input closed");
                return self.close();
            }
            Err(e) => {
                self.sink.error(&e);
                return self.close();
            }
        };

        if is_exit_command(&line) {
            tracing::debug!("exit command received");
            return self.close();
        }

        let Some(_permit) = self.guard.enter() else {
            tracing::warn!("guard taken between check and dispatch, dropping line");
            self.sink.busy();
            return LoopState::Busy;
        };

        match self.run_turn(line).await {
            Ok(output) => {
                self.completed.fetch_add(1, Ordering::SeqCst);
                tracing::info!(
                    chars = output.response.len(),
                    elapsed_ms = output.total_elapsed().as_millis() as u64,
                    "turn complete"
                );
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                tracing::warn!(stage = ?e.stage(), error = %e, "turn failed");
                self.sink.error(&e);
            }
        }
        LoopState::Idle
    }

    /// Step until the loop closes.
    pub async fn run(&self) -> LoopSummary {
        loop {
            if self.guard.is_busy() {
                tokio::time::sleep(BUSY_POLL_INTERVAL).await;
                continue;
            }
            if self.step().await == LoopState::Closed {
                break;
            }
        }
        self.summary()
    }

    async fn run_turn(&self, line: String) -> Result<TurnOutput> {
        let input = self.resolve_input(line)?;
        self.pipeline.run(input, self.sink.as_ref()).await
    }

    fn resolve_input(&self, line: String) -> Result<TurnInput> {
        if let Some(sample_rate) = self.audio_sample_rate
            && let Some(path) = line.trim().strip_prefix(AUDIO_LINE_PREFIX)
        {
            let path = Path::new(path.trim());
            tracing::debug!(path = %path.display(), "loading audio file");
            let audio = load_audio_file(path, sample_rate)?;
            return Ok(TurnInput::audio(audio));
        }
        Ok(TurnInput::text(line))
    }

    fn close(&self) -> LoopState {
        self.closed.store(true, Ordering::SeqCst);
        LoopState::Closed
    }
}
