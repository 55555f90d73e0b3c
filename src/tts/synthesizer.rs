use crate::error::{LingoError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Trait for speech synthesis.
///
/// Voice, language and encoding are fixed by the implementation's config.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return the encoded audio bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    /// Name for logging/debugging.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Arc<T> {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        (**self).synthesize(text).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock synthesizer for testing: returns the text's UTF-8 bytes.
#[derive(Debug, Clone, Default)]
pub struct MockSynthesizer {
    should_fail: bool,
    texts: Arc<Mutex<Vec<String>>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Texts synthesized so far, across clones.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        if let Ok(mut texts) = self.texts.lock() {
            texts.push(text.to_string());
        }
        if self.should_fail {
            return Err(LingoError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }
        Ok(text.as_bytes().to_vec())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
