use crate::error::Result;
use async_trait::async_trait;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

/// Source of user lines, each requested with a prompt.
#[async_trait]
pub trait LineSource: Send {
    /// Show `prompt` and wait for one line. `Ok(None)` means input is closed.
    async fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

#[async_trait]
impl<T: LineSource + ?Sized> LineSource for Box<T> {
    async fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        (**self).next_line(prompt).await
    }
}

/// Reads prompted lines from standard input (or any buffered reader).
///
/// Invalid UTF-8 is replaced with U+FFFD rather than failing the read.
pub struct StdinLines<R = BufReader<Stdin>> {
    reader: R,
    buffer: Vec<u8>,
}

impl StdinLines {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for StdinLines {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncBufRead + Unpin + Send> StdinLines<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
        }
    }

    async fn read_line_lossy(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer).await? == 0 {
            return Ok(None);
        }
        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }

        let line = String::from_utf8_lossy(&self.buffer);
        if let Cow::Owned(_) = line {
            tracing::warn!("input line was not valid UTF-8, invalid bytes replaced");
        }
        Ok(Some(line.into_owned()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> LineSource for StdinLines<R> {
    async fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;
        self.read_line_lossy().await
    }
}

/// Pre-recorded lines, for tests and scripted sessions.
///
/// Clones share the remaining lines and the prompt log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLines {
    lines: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Arc::new(Mutex::new(lines.into_iter().map(Into::into).collect())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts shown so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Lines not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LineSource for ScriptedLines {
    async fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(self.lines.lock().ok().and_then(|mut l| l.pop_front()))
    }
}
