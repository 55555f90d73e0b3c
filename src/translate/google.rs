//! Cloud Translation v2 client (`language/translate/v2`).

use crate::cloud::{CloudAuth, post_json};
use crate::config::TranslationConfig;
use crate::error::{LingoError, Result, Stage};
use crate::translate::translator::Translator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: [&'a str; 1],
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslationList,
}

#[derive(Debug, Deserialize)]
struct TranslationList {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Translator backed by the Cloud Translation REST API.
pub struct GoogleTranslator {
    client: reqwest::Client,
    auth: CloudAuth,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig, auth: CloudAuth) -> Self {
        Self::with_client(config, auth, reqwest::Client::new())
    }

    pub fn with_client(
        config: &TranslationConfig,
        auth: CloudAuth,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            auth,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let url = format!("{}/language/translate/v2", self.base_url);
        let request = TranslateRequest {
            q: [text],
            target: target_language,
            format: "text",
        };

        let response: TranslateResponse =
            post_json(&self.client, &self.auth, &url, &request, Stage::Translate).await?;

        response
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| LingoError::Translation {
                message: "response contained no translations".to_string(),
            })
    }

    fn name(&self) -> &str {
        "google-translate"
    }
}
