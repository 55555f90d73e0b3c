//! Conversational model stage.

pub mod gemini;
pub mod model;
pub mod sse;
pub mod types;

pub use gemini::GeminiChat;
pub use model::{ChatModel, ChunkStream, MockChatModel};
