//! Trajectory continuity evaluation for driving perception output.
//!
//! Observations coming out of a perception/tracking stack are associated
//! frame by frame with persistent track identities. Association is gated by a
//! localisation tolerance (metres) and tracks survive a bounded number of
//! occluded frames before they are declared lost. The run is folded into an
//! [`EvaluationResult`] with matches, identity switches, fragmentations, lost
//! tracks and recoveries after occlusion.
//!
//! ```rust,ignore
//! use trackeval_rs::{ContinuityEngine, EngineConfig, Observation, Position};
//!
//! let mut engine = ContinuityEngine::new(EngineConfig::default())?;
//! engine.update(0, &[Observation::new(Position::from_xy(1.0, 2.0))])?;
//! let result = engine.finalize();
//! ```

pub mod integration;
pub mod tracker;

pub use integration::{
    EvaluationPipeline, FrameSource, ObservationBuilder, Recording, Report, evaluate_recording,
    load_recording, write_report,
};
pub use tracker::{
    AssignmentStrategy, ContinuityEngine, EngineConfig, EvaluationResult, Frame, Observation,
    Position, SourceId, Track, TrackEvent, TrackState, TrackSummary,
};

pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors raised while validating input or running an evaluation.
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Frame index {current} does not follow frame {previous}")]
        NonMonotonicFrame { previous: u64, current: u64 },

        #[error("Invalid observation {index} in frame {frame}: {reason}")]
        InvalidObservation {
            frame: u64,
            index: usize,
            reason: String,
        },

        #[error("Invalid ego trajectory: {0}")]
        InvalidEgo(String),

        #[error("Evaluation cancelled before completion")]
        Cancelled,

        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
    }

    impl From<std::convert::Infallible> for Error {
        fn from(never: std::convert::Infallible) -> Self {
            match never {}
        }
    }

    /// Result type for evaluation operations.
    pub type Result<T> = std::result::Result<T, Error>;
}
