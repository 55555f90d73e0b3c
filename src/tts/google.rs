//! Cloud Text-to-Speech client (`text:synthesize`).

use crate::cloud::{CloudAuth, post_json};
use crate::config::{AudioEncoding, SsmlGender, SynthesisConfig};
use crate::error::{LingoError, Result, Stage};
use crate::tts::synthesizer::SpeechSynthesizer;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    ssml_gender: SsmlGender,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: AudioEncoding,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// Synthesizer backed by the Cloud Text-to-Speech REST API.
pub struct GoogleSynthesizer {
    client: reqwest::Client,
    auth: CloudAuth,
    config: SynthesisConfig,
}

impl GoogleSynthesizer {
    pub fn new(config: SynthesisConfig, auth: CloudAuth) -> Self {
        Self::with_client(config, auth, reqwest::Client::new())
    }

    pub fn with_client(
        config: SynthesisConfig,
        auth: CloudAuth,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            auth,
            config,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}/text:synthesize", self.config.base_url.trim_end_matches('/'));
        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &self.config.language_code,
                ssml_gender: self.config.ssml_gender,
            },
            audio_config: AudioConfig {
                audio_encoding: self.config.audio_encoding,
            },
        };

        let response: SynthesizeResponse =
            post_json(&self.client, &self.auth, &url, &request, Stage::Synthesize).await?;

        let audio = STANDARD
            .decode(response.audio_content.as_bytes())
            .map_err(|e| LingoError::Synthesis {
                message: format!("invalid audio payload: {e}"),
            })?;

        debug!(bytes = audio.len(), "synthesis finished");
        Ok(audio)
    }

    fn name(&self) -> &str {
        "google-tts"
    }
}
