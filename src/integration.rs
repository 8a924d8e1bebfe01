//! Integration layer around the continuity engine.
//!
//! This module loads recordings from JSON, feeds them through the engine
//! via the [`FrameSource`] abstraction and writes the resulting report.

mod builder;
mod emitter;
mod loader;
mod pipeline;
mod report;
mod source;

pub use builder::ObservationBuilder;
pub use emitter::{to_json_string, write_report};
pub use loader::{EgoRecord, FrameRecord, ObjectRecord, Recording, load_recording};
pub use pipeline::EvaluationPipeline;
pub use report::{Report, evaluate_recording};
pub use source::{FrameSource, InMemoryFrames};
