//! Text-to-speech stage.

pub mod google;
pub mod synthesizer;

pub use google::GoogleSynthesizer;
pub use synthesizer::{MockSynthesizer, SpeechSynthesizer};
