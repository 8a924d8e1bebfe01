//! EvaluationPipeline for combining a frame source with the continuity engine.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::tracker::{ContinuityEngine, EngineConfig, EvaluationResult, FrameOutcome, TrackEvent};
use crate::{Error, Result};

use super::FrameSource;

/// A combined evaluator that bundles a frame source with the engine.
///
/// This struct provides a convenient way to run an end-to-end evaluation
/// by combining any `FrameSource` with the `ContinuityEngine`.
pub struct EvaluationPipeline<S: FrameSource> {
    source: S,
    engine: ContinuityEngine,
}

impl<S> EvaluationPipeline<S>
where
    S: FrameSource,
    S::Error: Into<Error>,
{
    /// Create a new pipeline with the given source and engine config.
    pub fn new(source: S, config: EngineConfig) -> Result<Self> {
        Ok(Self {
            source,
            engine: ContinuityEngine::new(config)?,
        })
    }

    /// Create a new pipeline with the default engine configuration.
    pub fn with_default_config(source: S) -> Result<Self> {
        Self::new(source, EngineConfig::default())
    }

    /// Pull one frame from the source and feed it to the engine.
    ///
    /// Returns `None` once the source is exhausted.
    pub fn process_next_frame(&mut self) -> Result<Option<FrameOutcome>> {
        let Some(frame) = self.source.next_frame().map_err(Into::into)? else {
            return Ok(None);
        };
        let outcome = self.engine.update_frame(&frame)?;
        log_outcome(&outcome);
        Ok(Some(outcome))
    }

    /// Process every remaining frame and finalize the result.
    pub fn run(self) -> Result<EvaluationResult> {
        self.run_until_cancelled(&AtomicBool::new(false))
    }

    /// Like [`run`](Self::run), but checks `cancel` between frames.
    ///
    /// A cancelled run returns [`Error::Cancelled`] and no partial result.
    pub fn run_until_cancelled(mut self, cancel: &AtomicBool) -> Result<EvaluationResult> {
        loop {
            if cancel.load(Ordering::Relaxed) {
                tracing::warn!(
                    last_frame = ?self.engine.last_frame(),
                    "evaluation cancelled"
                );
                return Err(Error::Cancelled);
            }
            if self.process_next_frame()?.is_none() {
                break;
            }
        }

        let result = self.engine.finalize();
        tracing::info!(
            frames = result.summary.frames_processed,
            tracks = result.summary.total_tracks,
            matches = result.summary.total_matches,
            lost = result.summary.lost_tracks,
            recovered = result.summary.recovered_after_occlusion,
            identity_switches = result.summary.identity_switches,
            fragmentations = result.summary.fragmentations,
            "evaluation finished"
        );
        Ok(result)
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a reference to the underlying engine.
    pub fn engine(&self) -> &ContinuityEngine {
        &self.engine
    }
}

fn log_outcome(outcome: &FrameOutcome) {
    for event in &outcome.events {
        match event {
            TrackEvent::IdentitySwitch {
                track_id,
                frame,
                previous,
                current,
            } => {
                tracing::debug!(track_id, frame, %previous, %current, "identity switch");
            }
            TrackEvent::Lost {
                track_id,
                frame,
                last_seen,
            } => {
                tracing::debug!(track_id, frame, last_seen, "track lost");
            }
            TrackEvent::ClassSwitch {
                track_id,
                frame,
                previous,
                current,
            } => {
                tracing::warn!(track_id, frame, %previous, %current, "object class changed");
            }
            _ => {}
        }
    }
}
