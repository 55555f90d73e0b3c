//! lingochat - chat with Gemini, get the answer translated
//!
//! Each turn runs [transcribe →] chat → translate [→ synthesize] against the
//! Google REST APIs, one turn at a time.

// Enforce error handling discipline: propagate, don't panic
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod chat;
#[cfg(feature = "cli")]
pub mod cli;
pub mod cloud;
pub mod config;
pub mod conversation;
pub mod defaults;
pub mod error;
pub mod guard;
pub mod input;
pub mod pipeline;
pub mod stt;
pub mod translate;
pub mod tts;

// Stage traits
pub use chat::{ChatModel, ChunkStream};
pub use stt::Transcriber;
pub use translate::Translator;
pub use tts::SpeechSynthesizer;

// Turn and loop
pub use conversation::{ConversationLoop, LoopState, LoopSummary};
pub use guard::{FlightPermit, SingleFlight};
pub use input::LineSource;
pub use pipeline::{CollectorSink, StdoutSink, TurnInput, TurnOutput, TurnPipeline, TurnSink};

// Error handling
pub use error::{LingoError, Result, Stage};

// Config
pub use config::{Config, EmptyTranscriptPolicy, Variant};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        // "0.1.0+<hash>" in a git checkout, plain "0.1.0" otherwise
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(
                hash_part.len(),
                7,
                "Git hash should be 7 chars, got: {}",
                hash_part
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
