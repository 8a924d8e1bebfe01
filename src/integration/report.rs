//! The evaluation report written for one recording.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::integration::{EvaluationPipeline, InMemoryFrames, Recording};
use crate::tracker::{
    ClassSwitchReport, EngineConfig, EvaluationResult, MetricsSummary, TrackSummary,
    localisation_anomalies,
};

/// Everything known about one evaluated recording.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Parameters the run was made with
    pub parameters: EngineConfig,
    pub summary: MetricsSummary,
    pub tracks: Vec<TrackSummary>,
    pub class_switches: ClassSwitchReport,
    /// Ego sample index -> dead-reckoning error (m) above tolerance
    pub localisation: BTreeMap<usize, f64>,
}

/// Validate a recording, run it through the engine and build its report.
///
/// The whole recording is validated before the engine sees a single frame.
pub fn evaluate_recording(recording: &Recording, config: EngineConfig) -> Result<Report> {
    let frames = recording.frames()?;
    let ego = recording.ego_samples()?;

    let result = EvaluationPipeline::new(InMemoryFrames::new(frames), config.clone())?.run()?;

    let localisation = match ego {
        Some((samples, fps)) => {
            localisation_anomalies(&samples, fps, config.localisation_max_diff)
        }
        None => BTreeMap::new(),
    };
    if !localisation.is_empty() {
        tracing::warn!(
            anomalies = localisation.len(),
            "ego trajectory deviates from dead reckoning"
        );
    }

    let EvaluationResult {
        summary,
        tracks,
        class_switches,
    } = result;
    Ok(Report {
        parameters: config,
        summary,
        tracks,
        class_switches,
        localisation,
    })
}
