//! Gemini chat session over the `streamGenerateContent` REST endpoint.

use crate::chat::model::{ChatModel, ChunkStream};
use crate::chat::sse::sse_data;
use crate::chat::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::cloud::api_error_message;
use crate::config::ChatConfig;
use crate::error::{LingoError, Result};
use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt, future};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Conversation with one Gemini model.
///
/// History starts empty. With `retain_history` off (the default) it stays
/// empty, so each message is sent without prior context.
pub struct GeminiChat {
    client: reqwest::Client,
    api_key: String,
    config: ChatConfig,
    history: Mutex<Vec<Content>>,
}

impl GeminiChat {
    pub fn new(config: ChatConfig, api_key: String) -> Self {
        Self::with_client(config, api_key, reqwest::Client::new())
    }

    pub fn with_client(config: ChatConfig, api_key: String, client: reqwest::Client) -> Self {
        Self {
            client,
            api_key,
            config,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Number of messages currently held as context.
    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, message: &str) -> GenerateContentRequest {
        let mut contents = self.history.lock().map(|h| h.clone()).unwrap_or_default();
        contents.push(Content::user(message));
        GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }
}

/// Decode one SSE payload into the chunk's text.
fn chunk_text(data: &str) -> Result<String> {
    let response: GenerateContentResponse =
        serde_json::from_str(data).map_err(|e| LingoError::Chat {
            message: format!("malformed stream chunk: {e}"),
        })?;
    response
        .text()
        .map_err(|message| LingoError::Chat { message })
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn send_message_stream(&self, message: &str) -> Result<ChunkStream> {
        let request = self.build_request(message);
        debug!(
            model = %self.config.model,
            contents = request.contents.len(),
            max_output_tokens = self.config.max_output_tokens,
            "starting Gemini stream"
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LingoError::Chat {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| LingoError::Chat {
                message: format!("HTTP {}: failed to read error body: {e}", status.as_u16()),
            })?;
            warn!(status = status.as_u16(), "Gemini API error");
            return Err(LingoError::Chat {
                message: api_error_message(&body, status.as_u16()),
            });
        }

        let chunks = sse_data(response.bytes_stream())
            .map(|data| data.and_then(|d| chunk_text(&d)))
            .try_filter(|text| future::ready(!text.is_empty()));

        Ok(Box::pin(chunks))
    }

    fn complete_exchange(&self, message: &str, response: &str) {
        if !self.config.retain_history {
            return;
        }
        if let Ok(mut history) = self.history.lock() {
            history.push(Content::user(message));
            history.push(Content::model(response));
        }
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
