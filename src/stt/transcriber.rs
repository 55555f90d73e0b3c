use crate::error::{LingoError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (Cloud Speech vs mock).
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio buffer to text.
    ///
    /// # Arguments
    /// * `audio` - 16-bit little-endian PCM bytes at the configured sample rate
    ///
    /// # Returns
    /// The joined transcript, empty when nothing was recognized
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;

    /// Name for logging/debugging.
    fn name(&self) -> &str;
}

/// Implement Transcriber for Arc<T> to allow sharing across pipelines.
#[async_trait]
impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        (**self).transcribe(audio).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    response: String,
    should_fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new() -> Self {
        Self {
            response: "mock transcription".to_string(),
            should_fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Number of times `transcribe` was called, across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            Err(LingoError::Transcription {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transcriber_returns_response() {
        let transcriber = MockTranscriber::new().with_response("Bonjour tout le monde");
        let result = transcriber.transcribe(&[0u8; 320]).await.unwrap();
        assert_eq!(result, "Bonjour tout le monde");
    }

    #[tokio::test]
    async fn test_mock_transcriber_returns_error_when_configured() {
        let transcriber = MockTranscriber::new().with_failure();
        match transcriber.transcribe(&[]).await {
            Err(LingoError::Transcription { message }) => {
                assert_eq!(message, "mock transcription failure");
            }
            other => panic!("Expected Transcription error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mock_transcriber_counts_calls_across_clones() {
        let transcriber = MockTranscriber::new();
        let clone = transcriber.clone();
        clone.transcribe(&[]).await.unwrap();
        transcriber.transcribe(&[]).await.unwrap();
        assert_eq!(transcriber.calls(), 2);
    }

    #[tokio::test]
    async fn test_transcriber_trait_is_object_safe() {
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(MockTranscriber::new().with_response("boxed test"));
        assert_eq!(transcriber.name(), "mock");
        assert_eq!(transcriber.transcribe(&[]).await.unwrap(), "boxed test");
    }
}
