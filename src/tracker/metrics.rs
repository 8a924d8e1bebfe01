//! Continuity metrics: folds the engine's event stream into the final result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tracker::track::TrackEvent;
use crate::tracker::track_state::TrackState;

/// Aggregate counts over a whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// Observations attached to a track, births included
    pub total_matches: u64,
    /// Upstream identifier changes on an unbroken track
    pub identity_switches: u64,
    /// Births explained by a recently lost track nearby
    pub fragmentations: u64,
    /// Tracks that exceeded the occlusion budget
    pub lost_tracks: u64,
    /// Occluded tracks that were matched again
    pub recovered_after_occlusion: u64,
    /// Distinct track identifiers created
    pub total_tracks: u64,
    /// Frames evaluated, skipped indices included
    pub frames_processed: u64,
    /// Frames without any observation
    pub empty_frames: u64,
}

/// Lifespan summary of one track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub track_id: u64,
    pub first_frame: u64,
    /// Last frame the track was observed in
    pub last_frame: u64,
    pub frames_active: u32,
    pub frames_occluded: u32,
    pub final_state: TrackState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

/// One object-class inconsistency on a track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSwitch {
    pub frame: u64,
    pub track_id: u64,
    pub previous_object_type: String,
    pub new_object_type: String,
}

impl ClassSwitch {
    /// Summary key such as `car_2_truck`.
    pub fn key(&self) -> String {
        format!(
            "{}_2_{}",
            self.previous_object_type.to_lowercase(),
            self.new_object_type.to_lowercase()
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSwitchReport {
    pub raw: Vec<ClassSwitch>,
    pub summary: BTreeMap<String, u64>,
}

/// Result of one evaluation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub summary: MetricsSummary,
    /// Per-track summaries in ascending track id order
    pub tracks: Vec<TrackSummary>,
    pub class_switches: ClassSwitchReport,
}

impl EvaluationResult {
    pub fn track(&self, track_id: u64) -> Option<&TrackSummary> {
        self.tracks.iter().find(|t| t.track_id == track_id)
    }
}

/// Pure fold over [`TrackEvent`]s.
///
/// Identical event streams always produce identical results.
#[derive(Debug, Default)]
pub struct ContinuityAggregator {
    summary: MetricsSummary,
    tracks: BTreeMap<u64, TrackSummary>,
    class_switches: ClassSwitchReport,
    /// Consecutive occluded frames already credited, per occluded track
    occlusion_runs: BTreeMap<u64, u32>,
}

impl ContinuityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a complete event stream.
    pub fn fold<'a>(events: impl IntoIterator<Item = &'a TrackEvent>) -> EvaluationResult {
        let mut aggregator = Self::new();
        for event in events {
            aggregator.record(event);
        }
        aggregator.finish()
    }

    pub fn record(&mut self, event: &TrackEvent) {
        match event {
            TrackEvent::Created {
                track_id,
                frame,
                object_type,
            } => {
                // A birth attaches its observation as well.
                self.summary.total_tracks += 1;
                self.summary.total_matches += 1;
                self.tracks.insert(
                    *track_id,
                    TrackSummary {
                        track_id: *track_id,
                        first_frame: *frame,
                        last_frame: *frame,
                        frames_active: 1,
                        frames_occluded: 0,
                        final_state: TrackState::Active,
                        object_type: object_type.clone(),
                    },
                );
            }
            TrackEvent::Matched {
                track_id, frame, ..
            } => {
                self.summary.total_matches += 1;
                self.occlusion_runs.remove(track_id);
                if let Some(track) = self.tracks.get_mut(track_id) {
                    track.last_frame = *frame;
                    track.frames_active += 1;
                    track.final_state = TrackState::Active;
                }
            }
            TrackEvent::Recovered { .. } => self.summary.recovered_after_occlusion += 1,
            TrackEvent::Occluded {
                track_id,
                frames_occluded,
                ..
            } => {
                // A run of skipped frames arrives as a single event.
                let credited = self
                    .occlusion_runs
                    .insert(*track_id, *frames_occluded)
                    .unwrap_or(0);
                if let Some(track) = self.tracks.get_mut(track_id) {
                    track.frames_occluded = track
                        .frames_occluded
                        .saturating_add(frames_occluded.saturating_sub(credited));
                    track.final_state = TrackState::Occluded;
                }
            }
            TrackEvent::Lost { track_id, .. } => {
                self.summary.lost_tracks += 1;
                self.occlusion_runs.remove(track_id);
                if let Some(track) = self.tracks.get_mut(track_id) {
                    track.final_state = TrackState::Lost;
                }
            }
            TrackEvent::IdentitySwitch { .. } => self.summary.identity_switches += 1,
            TrackEvent::Fragmentation { .. } => self.summary.fragmentations += 1,
            TrackEvent::ClassSwitch {
                track_id,
                frame,
                previous,
                current,
            } => {
                let switch = ClassSwitch {
                    frame: *frame,
                    track_id: *track_id,
                    previous_object_type: previous.clone(),
                    new_object_type: current.clone(),
                };
                *self.class_switches.summary.entry(switch.key()).or_insert(0) += 1;
                self.class_switches.raw.push(switch);
            }
            TrackEvent::TypeAssigned {
                track_id,
                object_type,
            } => {
                if let Some(track) = self.tracks.get_mut(track_id) {
                    track.object_type = Some(object_type.clone());
                }
            }
            TrackEvent::EmptyFrame { .. } => self.summary.empty_frames += 1,
            TrackEvent::FrameProcessed { .. } => self.summary.frames_processed += 1,
            TrackEvent::SkippedFrames { count, .. } => {
                self.summary.empty_frames += count;
                self.summary.frames_processed += count;
            }
        }
    }

    pub fn finish(self) -> EvaluationResult {
        EvaluationResult {
            summary: self.summary,
            tracks: self.tracks.into_values().collect(),
            class_switches: self.class_switches,
        }
    }
}
