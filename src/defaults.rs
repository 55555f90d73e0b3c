//! Default configuration constants for lingochat.
//!
//! Every value the pipeline used to hard-code lives here, so the config
//! structs and the CLI agree on one set of defaults.

/// Default Gemini model for the chat stage.
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Upper bound on generated tokens per chat response.
pub const MAX_OUTPUT_TOKENS: u32 = 500;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Base URL of the Gemini REST API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Source language of spoken input.
pub const SOURCE_LANGUAGE: &str = "fr-FR";

/// Encoding of the audio buffer handed to speech recognition.
pub const AUDIO_INPUT_ENCODING: &str = "LINEAR16";

/// Sample rate of the audio buffer handed to speech recognition, in Hz.
///
/// WAV input at any other rate is resampled to this before upload.
pub const SAMPLE_RATE: u32 = 16000;

/// Base URL of the Cloud Speech-to-Text REST API.
pub const SPEECH_BASE_URL: &str = "https://speech.googleapis.com/v1";

/// Target language for translated responses.
pub const TARGET_LANGUAGE: &str = "es";

/// Base URL of the Cloud Translation (v2) REST API.
pub const TRANSLATE_BASE_URL: &str = "https://translation.googleapis.com";

/// Language of the synthesized voice.
pub const VOICE_LANGUAGE: &str = "es-ES";

/// Base URL of the Cloud Text-to-Speech REST API.
pub const TTS_BASE_URL: &str = "https://texttospeech.googleapis.com/v1";

/// File overwritten with synthesized speech after every speech turn.
pub const OUTPUT_PATH: &str = "output.mp3";

/// Line that ends the conversation (compared trimmed, case-insensitively).
pub const EXIT_KEYWORD: &str = "exit";

/// Prompt printed before reading a line.
pub const PROMPT: &str = "You: ";

/// Notice printed when a prompt is requested while a turn is in flight.
pub const BUSY_NOTICE: &str = "Please wait for the current response to complete.";

/// Prefix marking a prompt line as a path to an audio file (speech variant).
pub const AUDIO_LINE_PREFIX: char = '@';
