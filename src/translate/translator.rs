use crate::error::{LingoError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Trait for text translation.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` (ISO-639 code, e.g. `"es"`).
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;

    /// Name for logging/debugging.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        (**self).translate(text, target_language).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock translator for testing. Records every request it receives.
#[derive(Debug, Clone, Default)]
pub struct MockTranslator {
    response: Option<String>,
    should_fail: bool,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockTranslator {
    /// Echo translator: returns `"[<target>] <text>"`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// `(text, target_language)` pairs seen so far, across clones.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((text.to_string(), target_language.to_string()));
        }
        if self.should_fail {
            return Err(LingoError::Translation {
                message: "mock translation failure".to_string(),
            });
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| format!("[{target_language}] {text}")))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
