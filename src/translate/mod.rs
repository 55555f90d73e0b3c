//! Translation stage.

pub mod google;
pub mod translator;

pub use google::GoogleTranslator;
pub use translator::{MockTranslator, Translator};
