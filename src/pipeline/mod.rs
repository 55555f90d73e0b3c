//! The per-turn stage pipeline and its output.

pub mod sink;
pub mod turn;
pub mod types;

pub use sink::{CollectorSink, SinkEvent, StdoutSink, TurnSink};
pub use turn::TurnPipeline;
pub use types::{StageTiming, TurnInput, TurnOutput};
