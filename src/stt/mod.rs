//! Speech-to-text stage.

pub mod google;
pub mod transcriber;

pub use google::GoogleSpeechTranscriber;
pub use transcriber::{MockTranscriber, Transcriber};
