use crate::error::{LingoError, Result};
use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Finite, ordered, non-restartable sequence of response text fragments.
///
/// Dropping the stream abandons the rest of the response.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Trait for a streaming conversational model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one user message and return the streamed response.
    async fn send_message_stream(&self, message: &str) -> Result<ChunkStream>;

    /// Called once the stream for `message` has been consumed to the end.
    fn complete_exchange(&self, _message: &str, _response: &str) {}

    /// Name for logging/debugging.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: ChatModel + ?Sized> ChatModel for Arc<T> {
    async fn send_message_stream(&self, message: &str) -> Result<ChunkStream> {
        (**self).send_message_stream(message).await
    }

    fn complete_exchange(&self, message: &str, response: &str) {
        (**self).complete_exchange(message, response)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// How a [`MockChatModel`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockFailure {
    OnSend,
    /// Yield this many chunks, then an error.
    MidStream(usize),
}

/// Mock chat model for testing. Streams fixed chunks and records messages.
#[derive(Debug, Clone)]
pub struct MockChatModel {
    chunks: Vec<String>,
    failure: Option<MockFailure>,
    gate: Option<Arc<Notify>>,
    messages: Arc<Mutex<Vec<String>>>,
}

impl MockChatModel {
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            failure: None,
            gate: None,
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail before any chunk is produced.
    pub fn with_failure(mut self) -> Self {
        self.failure = Some(MockFailure::OnSend);
        self
    }

    /// Produce `after` chunks, then fail.
    pub fn with_stream_failure(mut self, after: usize) -> Self {
        self.failure = Some(MockFailure::MidStream(after));
        self
    }

    /// Hold every request until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Messages received so far, across clones.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn send_message_stream(&self, message: &str) -> Result<ChunkStream> {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let mut items: Vec<Result<String>> = self.chunks.iter().cloned().map(Ok).collect();
        match self.failure {
            Some(MockFailure::OnSend) => {
                return Err(LingoError::Chat {
                    message: "mock chat failure".to_string(),
                });
            }
            Some(MockFailure::MidStream(after)) => {
                items.truncate(after);
                items.push(Err(LingoError::Chat {
                    message: "mock stream failure".to_string(),
                }));
            }
            None => {}
        }

        Ok(Box::pin(futures_util::stream::iter(items)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
