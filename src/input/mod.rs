//! Prompted line input.

pub mod lines;

pub use lines::{LineSource, ScriptedLines, StdinLines};
