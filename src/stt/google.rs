//! Cloud Speech-to-Text client (`speech:recognize`).

use crate::cloud::{CloudAuth, post_json};
use crate::config::SpeechConfig;
use crate::error::{Result, Stage};
use crate::stt::transcriber::Transcriber;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'a str,
    sample_rate_hertz: u32,
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

impl RecognizeResponse {
    /// Top alternative of every result, one per line.
    fn joined_transcript(&self) -> String {
        self.results
            .iter()
            .map(|r| {
                r.alternatives
                    .first()
                    .map(|a| a.transcript.as_str())
                    .unwrap_or("")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Transcriber backed by the Cloud Speech-to-Text REST API.
pub struct GoogleSpeechTranscriber {
    client: reqwest::Client,
    auth: CloudAuth,
    config: SpeechConfig,
}

impl GoogleSpeechTranscriber {
    pub fn new(config: SpeechConfig, auth: CloudAuth) -> Self {
        Self::with_client(config, auth, reqwest::Client::new())
    }

    pub fn with_client(config: SpeechConfig, auth: CloudAuth, client: reqwest::Client) -> Self {
        Self {
            client,
            auth,
            config,
        }
    }

    fn url(&self) -> String {
        format!("{}/speech:recognize", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Transcriber for GoogleSpeechTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: &self.config.encoding,
                sample_rate_hertz: self.config.sample_rate_hertz,
                language_code: &self.config.language_code,
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(audio),
            },
        };

        let response: RecognizeResponse = post_json(
            &self.client,
            &self.auth,
            &self.url(),
            &request,
            Stage::Transcribe,
        )
        .await?;

        debug!(results = response.results.len(), "recognition finished");
        Ok(response.joined_transcript())
    }

    fn name(&self) -> &str {
        "google-speech"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LingoError;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> SpeechConfig {
        SpeechConfig {
            base_url: format!("{}/v1", server.uri()),
            ..Default::default()
        }
    }

    #[test]
    fn test_joined_transcript_uses_top_alternative() {
        let response: RecognizeResponse = serde_json::from_value(json!({
            "results": [
                {"alternatives": [{"transcript": "bonjour", "confidence": 0.9},
                                  {"transcript": "bon jour"}]},
                {"alternatives": [{"transcript": "ça va"}]}
            ]
        }))
        .unwrap();
        assert_eq!(response.joined_transcript(), "bonjour\nça va");
    }

    #[test]
    fn test_missing_results_is_empty_transcript() {
        let response: RecognizeResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.joined_transcript(), "");
    }

    #[tokio::test]
    async fn test_transcribe_sends_fixed_recognition_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/speech:recognize"))
            .and(body_json(json!({
                "config": {
                    "encoding": "LINEAR16",
                    "sampleRateHertz": 16000,
                    "languageCode": "fr-FR"
                },
                "audio": {"content": "AAECAw=="}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"alternatives": [{"transcript": "salut"}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transcriber = GoogleSpeechTranscriber::new(config_for(&server), CloudAuth::Ambient);
        let text = transcriber.transcribe(&[0, 1, 2, 3]).await.unwrap();
        assert_eq!(text, "salut");
    }

    #[tokio::test]
    async fn test_silent_audio_yields_empty_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let transcriber = GoogleSpeechTranscriber::new(config_for(&server), CloudAuth::Ambient);
        assert_eq!(transcriber.transcribe(&[0u8; 64]).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_upstream_error_is_transcription_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "bad audio", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let transcriber = GoogleSpeechTranscriber::new(config_for(&server), CloudAuth::Ambient);
        match transcriber.transcribe(&[]).await {
            Err(LingoError::Transcription { message }) => {
                assert!(message.contains("bad audio"));
            }
            other => panic!("Expected Transcription error, got {:?}", other),
        }
    }
}
