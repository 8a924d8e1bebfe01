mod continuity_engine;
mod ego_motion;
mod matching;
mod metrics;
mod observation;
mod position;
mod track;
mod track_state;

pub use continuity_engine::{AssignmentStrategy, ContinuityEngine, EngineConfig, FrameOutcome};
pub use ego_motion::{EgoSample, localisation_anomalies};
pub use matching::{
    AssignmentResult, Candidate, Match, candidate_pairs, greedy_assignment, optimal_assignment,
};
pub use metrics::{
    ClassSwitch, ClassSwitchReport, ContinuityAggregator, EvaluationResult, MetricsSummary,
    TrackSummary,
};
pub use observation::{Frame, Observation, SourceId};
pub use position::{Position, distance_matrix};
pub use track::{Track, TrackEvent};
pub use track_state::TrackState;
