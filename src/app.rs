//! Chat application entry point.
//!
//! Wires configuration and credentials into the stage clients, then runs the
//! prompt loop on stdin until exit:
//! [transcribe →] chat → translate [→ synthesize]

use crate::chat::GeminiChat;
use crate::cloud::CloudAuth;
use crate::config::{Config, EmptyTranscriptPolicy, Variant};
use crate::conversation::{ConversationLoop, LoopSummary};
use crate::defaults::API_KEY_ENV;
use crate::error::{LingoError, Result};
use crate::input::StdinLines;
use crate::pipeline::{StdoutSink, TurnPipeline};
use crate::stt::GoogleSpeechTranscriber;
use crate::translate::GoogleTranslator;
use crate::tts::GoogleSynthesizer;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line overrides, applied on top of file and environment config.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub speech: bool,
    pub model: Option<String>,
    pub target_language: Option<String>,
    pub voice_language: Option<String>,
    pub output: Option<PathBuf>,
    pub on_empty_transcript: Option<EmptyTranscriptPolicy>,
}

impl Overrides {
    pub fn apply(self, mut config: Config) -> Result<Config> {
        if self.speech {
            config.variant = Variant::Speech;
        }
        if let Some(model) = self.model {
            config.chat.model = model;
        }
        if let Some(target) = self.target_language {
            config.translation.target_language = target;
        }
        if let Some(voice) = self.voice_language {
            config.synthesis.language_code = voice;
        }
        if let Some(output) = self.output {
            config.synthesis.output_path = output;
        }
        if let Some(policy) = self.on_empty_transcript {
            config.speech.on_empty_transcript = policy;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Read the Gemini API key. Its absence is a startup error.
pub fn api_key_from_env() -> Result<String> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(LingoError::MissingCredential {
            var: API_KEY_ENV.to_string(),
        }),
    }
}

/// Build the stage pipeline for `config.variant` against the Google APIs.
pub fn build_pipeline(config: &Config, api_key: String, auth: CloudAuth) -> TurnPipeline {
    let client = reqwest::Client::new();

    let chat = GeminiChat::with_client(config.chat.clone(), api_key, client.clone());
    let translator = GoogleTranslator::with_client(&config.translation, auth.clone(), client.clone());
    let pipeline = TurnPipeline::new(
        Arc::new(chat),
        Arc::new(translator),
        config.translation.target_language.clone(),
    );

    match config.variant {
        Variant::Text => pipeline,
        Variant::Speech => {
            let transcriber =
                GoogleSpeechTranscriber::with_client(config.speech.clone(), auth.clone(), client.clone());
            let synthesizer = GoogleSynthesizer::with_client(config.synthesis.clone(), auth, client);
            pipeline
                .with_transcriber(Arc::new(transcriber), config.speech.on_empty_transcript)
                .with_synthesizer(Arc::new(synthesizer), config.synthesis.output_path.clone())
        }
    }
}

/// Run an interactive session on stdin/stdout until exit or end of input.
pub async fn run_chat(config: Config) -> Result<LoopSummary> {
    let api_key = api_key_from_env()?;
    let auth = CloudAuth::from_env();

    tracing::info!(
        variant = ?config.variant,
        model = %config.chat.model,
        target = %config.translation.target_language,
        "starting conversation"
    );

    let pipeline = build_pipeline(&config, api_key, auth);
    let mut conversation = ConversationLoop::new(pipeline, StdinLines::new(), Arc::new(StdoutSink));
    if config.variant == Variant::Speech {
        conversation = conversation.with_audio_files(config.speech.sample_rate_hertz);
    }

    let summary = conversation.run().await;
    tracing::info!(
        completed = summary.turns_completed,
        failed = summary.turns_failed,
        "conversation closed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_overrides_switch_to_speech() {
        let config = Overrides {
            speech: true,
            model: Some("gemini-1.5-pro".to_string()),
            target_language: Some("it".to_string()),
            voice_language: Some("it-IT".to_string()),
            output: Some(PathBuf::from("/tmp/reply.mp3")),
            on_empty_transcript: Some(EmptyTranscriptPolicy::Abort),
        }
        .apply(Config::default())
        .unwrap();

        assert_eq!(config.variant, Variant::Speech);
        assert_eq!(config.chat.model, "gemini-1.5-pro");
        assert_eq!(config.translation.target_language, "it");
        assert_eq!(config.synthesis.language_code, "it-IT");
        assert_eq!(config.synthesis.output_path, PathBuf::from("/tmp/reply.mp3"));
        assert_eq!(config.speech.on_empty_transcript, EmptyTranscriptPolicy::Abort);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let config = Overrides::default().apply(Config::default()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides_are_validated() {
        let result = Overrides {
            target_language: Some("  ".to_string()),
            ..Default::default()
        }
        .apply(Config::default());
        assert!(matches!(result, Err(LingoError::ConfigInvalidValue { .. })));
    }

    #[test]
    fn test_missing_api_key_is_startup_error() {
        let _lock = ENV_LOCK.lock().unwrap();
        let saved = std::env::var(API_KEY_ENV).ok();
        // SAFETY: serialized by ENV_LOCK.
        unsafe { std::env::remove_var(API_KEY_ENV) };

        let result = api_key_from_env();

        if let Some(value) = saved {
            unsafe { std::env::set_var(API_KEY_ENV, value) };
        }
        match result {
            Err(LingoError::MissingCredential { var }) => assert_eq!(var, "API_KEY"),
            other => panic!("Expected MissingCredential, got {:?}", other),
        }
    }

    #[test]
    fn test_api_key_read_from_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        let saved = std::env::var(API_KEY_ENV).ok();
        unsafe { std::env::set_var(API_KEY_ENV, "test-key") };

        let result = api_key_from_env();

        match saved {
            Some(value) => unsafe { std::env::set_var(API_KEY_ENV, value) },
            None => unsafe { std::env::remove_var(API_KEY_ENV) },
        }
        assert_eq!(result.unwrap(), "test-key");
    }

    #[test]
    fn test_build_pipeline_per_variant() {
        let mut config = Config::default();
        let text = build_pipeline(&config, "k".to_string(), CloudAuth::Ambient);
        assert!(!text.has_transcriber());
        assert_eq!(text.target_language(), "es");

        config.variant = Variant::Speech;
        let speech = build_pipeline(&config, "k".to_string(), CloudAuth::Ambient);
        assert!(speech.has_transcriber());
    }
}
