use crate::defaults;
use crate::error::{LingoError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub variant: Variant,
    pub chat: ChatConfig,
    pub speech: SpeechConfig,
    pub translation: TranslationConfig,
    pub synthesis: SynthesisConfig,
}

/// Which stages a turn runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// chat → translate
    #[default]
    Text,
    /// transcribe → chat → translate → synthesize
    Speech,
}

/// Conversational model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub base_url: String,
    /// Append each completed exchange to the session history.
    ///
    /// Off by default: every turn is sent without prior context.
    pub retain_history: bool,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    pub language_code: String,
    pub encoding: String,
    pub sample_rate_hertz: u32,
    pub base_url: String,
    pub on_empty_transcript: EmptyTranscriptPolicy,
}

/// What a turn does when recognition returns no results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyTranscriptPolicy {
    /// Send an empty message to the chat stage.
    #[default]
    Proceed,
    /// Fail the turn with a transcription error.
    Abort,
}

impl std::str::FromStr for EmptyTranscriptPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proceed" => Ok(Self::Proceed),
            "abort" => Ok(Self::Abort),
            other => Err(format!(
                "unknown policy '{other}' (expected 'proceed' or 'abort')"
            )),
        }
    }
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslationConfig {
    pub target_language: String,
    pub base_url: String,
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthesisConfig {
    pub language_code: String,
    pub ssml_gender: SsmlGender,
    pub audio_encoding: AudioEncoding,
    pub output_path: PathBuf,
    pub base_url: String,
}

/// Voice gender requested from the synthesis API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SsmlGender {
    #[default]
    Neutral,
    Male,
    Female,
}

/// Encoding of the synthesized audio file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    Linear16,
    OggOpus,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            max_output_tokens: defaults::MAX_OUTPUT_TOKENS,
            base_url: defaults::GEMINI_BASE_URL.to_string(),
            retain_history: false,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language_code: defaults::SOURCE_LANGUAGE.to_string(),
            encoding: defaults::AUDIO_INPUT_ENCODING.to_string(),
            sample_rate_hertz: defaults::SAMPLE_RATE,
            base_url: defaults::SPEECH_BASE_URL.to_string(),
            on_empty_transcript: EmptyTranscriptPolicy::default(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: defaults::TARGET_LANGUAGE.to_string(),
            base_url: defaults::TRANSLATE_BASE_URL.to_string(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            language_code: defaults::VOICE_LANGUAGE.to_string(),
            ssml_gender: SsmlGender::default(),
            audio_encoding: AudioEncoding::default(),
            output_path: PathBuf::from(defaults::OUTPUT_PATH),
            base_url: defaults::TTS_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if the file doesn't exist.
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(LingoError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - LINGOCHAT_MODEL → chat.model
    /// - LINGOCHAT_TARGET_LANGUAGE → translation.target_language
    /// - LINGOCHAT_VOICE_LANGUAGE → synthesis.language_code
    /// - LINGOCHAT_OUTPUT → synthesis.output_path
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("LINGOCHAT_MODEL")
            && !model.is_empty()
        {
            self.chat.model = model;
        }

        if let Ok(target) = std::env::var("LINGOCHAT_TARGET_LANGUAGE")
            && !target.is_empty()
        {
            self.translation.target_language = target;
        }

        if let Ok(voice) = std::env::var("LINGOCHAT_VOICE_LANGUAGE")
            && !voice.is_empty()
        {
            self.synthesis.language_code = voice;
        }

        if let Ok(output) = std::env::var("LINGOCHAT_OUTPUT")
            && !output.is_empty()
        {
            self.synthesis.output_path = PathBuf::from(output);
        }

        self
    }

    /// Reject values the remote APIs would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if self.chat.model.trim().is_empty() {
            return Err(invalid("chat.model", "must not be empty"));
        }
        if self.chat.max_output_tokens == 0 {
            return Err(invalid("chat.max_output_tokens", "must be positive"));
        }
        if self.speech.sample_rate_hertz == 0 {
            return Err(invalid("speech.sample_rate_hertz", "must be positive"));
        }
        if self.translation.target_language.trim().is_empty() {
            return Err(invalid("translation.target_language", "must not be empty"));
        }
        if self.synthesis.output_path.as_os_str().is_empty() {
            return Err(invalid("synthesis.output_path", "must not be empty"));
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/lingochat/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("lingochat")
            .join("config.toml")
    }

    /// Serialize this config as TOML for display.
    pub fn to_display_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LingoError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// The built-in defaults rendered as a config file template.
    pub fn dump_template() -> String {
        let body = Self::default().to_display_toml().unwrap_or_default();
        format!(
            "# lingochat configuration\n# Place at {}\n\n{}",
            Self::default_path().display(),
            body
        )
    }
}

fn invalid(key: &str, message: &str) -> LingoError {
    LingoError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_lingochat_env() {
        remove_env("LINGOCHAT_MODEL");
        remove_env("LINGOCHAT_TARGET_LANGUAGE");
        remove_env("LINGOCHAT_VOICE_LANGUAGE");
        remove_env("LINGOCHAT_OUTPUT");
    }

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.variant, Variant::Text);

        assert_eq!(config.chat.model, "gemini-pro");
        assert_eq!(config.chat.max_output_tokens, 500);
        assert!(!config.chat.retain_history);

        assert_eq!(config.speech.language_code, "fr-FR");
        assert_eq!(config.speech.encoding, "LINEAR16");
        assert_eq!(config.speech.sample_rate_hertz, 16000);
        assert_eq!(
            config.speech.on_empty_transcript,
            EmptyTranscriptPolicy::Proceed
        );

        assert_eq!(config.translation.target_language, "es");

        assert_eq!(config.synthesis.language_code, "es-ES");
        assert_eq!(config.synthesis.ssml_gender, SsmlGender::Neutral);
        assert_eq!(config.synthesis.audio_encoding, AudioEncoding::Mp3);
        assert_eq!(config.synthesis.output_path, PathBuf::from("output.mp3"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_file = write_temp(
            r#"
            variant = "speech"

            [chat]
            model = "gemini-1.5-flash"
            max_output_tokens = 256
            retain_history = true

            [speech]
            language_code = "de-DE"
            on_empty_transcript = "abort"

            [translation]
            target_language = "it"

            [synthesis]
            language_code = "it-IT"
            ssml_gender = "FEMALE"
            audio_encoding = "OGG_OPUS"
            output_path = "/tmp/answer.ogg"
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.variant, Variant::Speech);
        assert_eq!(config.chat.model, "gemini-1.5-flash");
        assert_eq!(config.chat.max_output_tokens, 256);
        assert!(config.chat.retain_history);
        assert_eq!(config.speech.language_code, "de-DE");
        assert_eq!(config.speech.on_empty_transcript, EmptyTranscriptPolicy::Abort);
        assert_eq!(config.translation.target_language, "it");
        assert_eq!(config.synthesis.language_code, "it-IT");
        assert_eq!(config.synthesis.ssml_gender, SsmlGender::Female);
        assert_eq!(config.synthesis.audio_encoding, AudioEncoding::OggOpus);
        assert_eq!(
            config.synthesis.output_path,
            PathBuf::from("/tmp/answer.ogg")
        );
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let temp_file = write_temp(
            r#"
            [translation]
            target_language = "pt"
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.translation.target_language, "pt");
        assert_eq!(config.variant, Variant::Text);
        assert_eq!(config.chat, ChatConfig::default());
        assert_eq!(config.speech, SpeechConfig::default());
        assert_eq!(config.synthesis, SynthesisConfig::default());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let temp_file = write_temp(
            r#"
            [chat
            model = "broken
        "#,
        );

        let result = Config::load(temp_file.path());
        assert!(matches!(result, Err(LingoError::Config(_))));
    }

    #[test]
    fn test_zero_max_tokens_is_rejected() {
        let temp_file = write_temp(
            r#"
            [chat]
            max_output_tokens = 0
        "#,
        );

        match Config::load(temp_file.path()) {
            Err(LingoError::ConfigInvalidValue { key, .. }) => {
                assert_eq!(key, "chat.max_output_tokens");
            }
            other => panic!("Expected ConfigInvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_lingochat_config_12345.toml");
        let config = Config::load_or_default(missing_path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_errors_on_invalid_toml() {
        let temp_file = write_temp("variant = [");
        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_env_override_model() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_lingochat_env();

        set_env("LINGOCHAT_MODEL", "gemini-1.5-pro");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.chat.model, "gemini-1.5-pro");
        assert_eq!(config.translation.target_language, "es"); // Not overridden

        clear_lingochat_env();
    }

    #[test]
    fn test_env_override_all() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_lingochat_env();

        set_env("LINGOCHAT_MODEL", "gemini-1.5-flash");
        set_env("LINGOCHAT_TARGET_LANGUAGE", "ja");
        set_env("LINGOCHAT_VOICE_LANGUAGE", "ja-JP");
        set_env("LINGOCHAT_OUTPUT", "reply.mp3");

        let config = Config::default().with_env_overrides();

        assert_eq!(config.chat.model, "gemini-1.5-flash");
        assert_eq!(config.translation.target_language, "ja");
        assert_eq!(config.synthesis.language_code, "ja-JP");
        assert_eq!(config.synthesis.output_path, PathBuf::from("reply.mp3"));

        clear_lingochat_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_lingochat_env();

        set_env("LINGOCHAT_TARGET_LANGUAGE", "");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.translation.target_language, "es");

        clear_lingochat_env();
    }

    #[test]
    fn test_empty_transcript_policy_from_str() {
        assert_eq!(
            "proceed".parse::<EmptyTranscriptPolicy>(),
            Ok(EmptyTranscriptPolicy::Proceed)
        );
        assert_eq!(
            " ABORT ".parse::<EmptyTranscriptPolicy>(),
            Ok(EmptyTranscriptPolicy::Abort)
        );
        assert!("skip".parse::<EmptyTranscriptPolicy>().is_err());
    }

    #[test]
    fn test_display_toml_round_trips() {
        let config = Config::default();
        let rendered = config.to_display_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_dump_template_mentions_sections() {
        let template = Config::dump_template();
        assert!(template.starts_with("# lingochat configuration"));
        assert!(template.contains("[chat]"));
        assert!(template.contains("[synthesis]"));
        assert!(template.contains("ssml_gender = \"NEUTRAL\""));
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = Config::default_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("lingochat"));
        assert!(path_str.ends_with("config.toml"));
    }
}
