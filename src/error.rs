//! Error types for lingochat.

use std::fmt;
use thiserror::Error;

/// One step of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcribe,
    Chat,
    Translate,
    Synthesize,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 4] = [
        Stage::Transcribe,
        Stage::Chat,
        Stage::Translate,
        Stage::Synthesize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Transcribe => "transcribe",
            Stage::Chat => "chat",
            Stage::Translate => "translate",
            Stage::Synthesize => "synthesize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum LingoError {
    // Stage errors
    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    #[error("Chat request failed: {message}")]
    Chat { message: String },

    #[error("Translation failed: {message}")]
    Translation { message: String },

    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    // Configuration errors
    #[error("Missing credential: set the {var} environment variable")]
    MissingCredential { var: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl LingoError {
    /// Build the error variant belonging to `stage`.
    pub fn for_stage(stage: Stage, message: impl Into<String>) -> Self {
        let message = message.into();
        match stage {
            Stage::Transcribe => LingoError::Transcription { message },
            Stage::Chat => LingoError::Chat { message },
            Stage::Translate => LingoError::Translation { message },
            Stage::Synthesize => LingoError::Synthesis { message },
        }
    }

    /// The pipeline stage this error came from, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            LingoError::Transcription { .. } => Some(Stage::Transcribe),
            LingoError::Chat { .. } => Some(Stage::Chat),
            LingoError::Translation { .. } => Some(Stage::Translate),
            LingoError::Synthesis { .. } => Some(Stage::Synthesize),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LingoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_transcription_display() {
        let error = LingoError::Transcription {
            message: "status 403".to_string(),
        };
        assert_eq!(error.to_string(), "Transcription failed: status 403");
    }

    #[test]
    fn test_chat_display() {
        let error = LingoError::Chat {
            message: "prompt blocked: SAFETY".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Chat request failed: prompt blocked: SAFETY"
        );
    }

    #[test]
    fn test_translation_display() {
        let error = LingoError::Translation {
            message: "empty response".to_string(),
        };
        assert_eq!(error.to_string(), "Translation failed: empty response");
    }

    #[test]
    fn test_synthesis_display() {
        let error = LingoError::Synthesis {
            message: "quota exceeded".to_string(),
        };
        assert_eq!(error.to_string(), "Speech synthesis failed: quota exceeded");
    }

    #[test]
    fn test_missing_credential_display() {
        let error = LingoError::MissingCredential {
            var: "API_KEY".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Missing credential: set the API_KEY environment variable"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = LingoError::ConfigInvalidValue {
            key: "chat.max_output_tokens".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for chat.max_output_tokens: must be positive"
        );
    }

    #[test]
    fn test_for_stage_round_trips_through_stage() {
        for stage in Stage::ALL {
            let error = LingoError::for_stage(stage, "boom");
            assert_eq!(error.stage(), Some(stage));
            assert!(error.to_string().contains("boom"));
        }
    }

    #[test]
    fn test_non_stage_errors_have_no_stage() {
        assert_eq!(LingoError::Other("x".to_string()).stage(), None);
        let io_error: LingoError = io::Error::other("disk").into();
        assert_eq!(io_error.stage(), None);
    }

    #[test]
    fn test_stage_names_in_pipeline_order() {
        let names: Vec<&str> = Stage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["transcribe", "chat", "translate", "synthesize"]);
        assert_eq!(Stage::Translate.to_string(), "translate");
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: LingoError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<LingoError>();
        assert_sync::<LingoError>();
    }
}
