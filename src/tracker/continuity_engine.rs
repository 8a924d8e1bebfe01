//! Frame-by-frame continuity engine.

use serde::{Deserialize, Serialize};

use crate::tracker::matching::{self, AssignmentResult};
use crate::tracker::metrics::{ContinuityAggregator, EvaluationResult};
use crate::tracker::observation::{Frame, Observation};
use crate::tracker::position::{Position, distance_matrix};
use crate::tracker::track::{Track, TrackEvent};
use crate::{Error, Result};

/// Assignment policy used by the spatial matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStrategy {
    /// Nearest-first greedy matching
    #[default]
    Greedy,
    /// Minimum-cost bipartite matching
    Optimal,
}

/// Configuration for the continuity engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum same-frame distance (metres) for a match
    pub localisation_max_diff: f64,
    /// Consecutive missed frames tolerated before a track is lost
    pub max_occluded_frames: u32,
    pub assignment: AssignmentStrategy,
    /// Frames after a loss during which a nearby birth counts as a fragmentation
    pub fragmentation_window: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            localisation_max_diff: 0.5,
            max_occluded_frames: 1,
            assignment: AssignmentStrategy::Greedy,
            fragmentation_window: 10,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.localisation_max_diff.is_finite() || self.localisation_max_diff <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "localisation_max_diff must be a positive number of metres, got {}",
                self.localisation_max_diff
            )));
        }
        if self.fragmentation_window == 0 {
            return Err(Error::InvalidConfig(
                "fragmentation_window must be at least one frame".to_string(),
            ));
        }
        Ok(())
    }
}

/// Events produced by one call to [`ContinuityEngine::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    pub frame: u64,
    /// Events in processing order, skipped frames first
    pub events: Vec<TrackEvent>,
}

impl FrameOutcome {
    pub fn count(&self, predicate: impl Fn(&TrackEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

#[derive(Debug, Clone)]
struct LostTrack {
    track_id: u64,
    lost_frame: u64,
    position: Position,
}

/// Caller-owned evaluation context.
///
/// Construct with [`ContinuityEngine::new`], feed frames in strictly
/// increasing index order with [`ContinuityEngine::update`], then consume
/// with [`ContinuityEngine::finalize`].
pub struct ContinuityEngine {
    /// Ascending track id order
    active_tracks: Vec<Track>,
    recently_lost: Vec<LostTrack>,
    last_frame: Option<u64>,
    next_track_id: u64,
    config: EngineConfig,
    aggregator: ContinuityAggregator,
}

impl ContinuityEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            active_tracks: Vec::new(),
            recently_lost: Vec::new(),
            last_frame: None,
            next_track_id: 1,
            config,
            aggregator: ContinuityAggregator::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn active_tracks(&self) -> &[Track] {
        &self.active_tracks
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    pub fn update_frame(&mut self, frame: &Frame) -> Result<FrameOutcome> {
        self.update(frame.index, &frame.observations)
    }

    /// Process the observations of `frame_index`.
    ///
    /// Indices skipped since the previous frame are processed as empty
    /// frames first. Input is validated before any state changes.
    pub fn update(&mut self, frame_index: u64, observations: &[Observation]) -> Result<FrameOutcome> {
        if let Some(previous) = self.last_frame {
            if frame_index <= previous {
                return Err(Error::NonMonotonicFrame {
                    previous,
                    current: frame_index,
                });
            }
        }
        for (index, observation) in observations.iter().enumerate() {
            if !observation.position.is_finite() {
                return Err(Error::InvalidObservation {
                    frame: frame_index,
                    index,
                    reason: "position has non-finite coordinates".to_string(),
                });
            }
        }

        let mut events = Vec::new();
        if let Some(previous) = self.last_frame {
            self.skip_frames(previous + 1, frame_index, &mut events);
        }
        self.step(frame_index, observations, &mut events);
        self.last_frame = Some(frame_index);

        for event in &events {
            tracing::trace!(?event);
            self.aggregator.record(event);
        }

        Ok(FrameOutcome {
            frame: frame_index,
            events,
        })
    }

    /// Finalize the run. Tracks still alive keep their current state.
    pub fn finalize(self) -> EvaluationResult {
        let result = self.aggregator.finish();
        tracing::debug!(
            frames = result.summary.frames_processed,
            tracks = result.summary.total_tracks,
            "continuity engine finalized"
        );
        result
    }

    /// Process frames in `first..end` that carried no observations.
    ///
    /// An empty frame can only occlude or lose tracks, so the whole gap is
    /// applied at once and costs the same for any length.
    fn skip_frames(&mut self, first: u64, end: u64, events: &mut Vec<TrackEvent>) {
        if first >= end {
            return;
        }
        let count = end - first;
        let max_occluded_frames = self.config.max_occluded_frames;

        let mut survivors = Vec::with_capacity(self.active_tracks.len());
        for mut track in self.active_tracks.drain(..) {
            match track.mark_missed_run(first, count, max_occluded_frames, events) {
                Some(lost_frame) => self.recently_lost.push(LostTrack {
                    track_id: track.track_id,
                    lost_frame,
                    position: track.position,
                }),
                None => survivors.push(track),
            }
        }
        self.active_tracks = survivors;

        tracing::debug!(first, count, tracks = self.active_tracks.len(), "frames skipped");
        events.push(TrackEvent::SkippedFrames { first, count });
    }

    fn assign(&self, observations: &[Observation]) -> AssignmentResult {
        let track_positions: Vec<Position> = self.active_tracks.iter().map(|t| t.position).collect();
        let obs_positions: Vec<Position> = observations.iter().map(|o| o.position).collect();
        let dists = distance_matrix(&track_positions, &obs_positions);

        match self.config.assignment {
            AssignmentStrategy::Greedy => {
                matching::greedy_assignment(&dists, self.config.localisation_max_diff)
            }
            AssignmentStrategy::Optimal => {
                matching::optimal_assignment(&dists, self.config.localisation_max_diff)
            }
        }
    }

    fn step(&mut self, frame: u64, observations: &[Observation], events: &mut Vec<TrackEvent>) {
        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_observations,
        } = self.assign(observations);

        tracing::debug!(
            frame,
            tracks = self.active_tracks.len(),
            observations = observations.len(),
            matches = matches.len(),
            "frame associated"
        );

        // Step 1: Matched tracks
        for m in &matches {
            self.active_tracks[m.row].mark_matched(&observations[m.col], frame, m.distance, events);
        }

        // Step 2: Missed tracks, finalize the ones over budget
        for &row in &unmatched_tracks {
            let event = self.active_tracks[row].mark_missed(frame, self.config.max_occluded_frames);
            events.push(event);
        }

        let mut survivors = Vec::with_capacity(self.active_tracks.len());
        for track in self.active_tracks.drain(..) {
            if track.is_lost() {
                self.recently_lost.push(LostTrack {
                    track_id: track.track_id,
                    lost_frame: frame,
                    position: track.position,
                });
            } else {
                survivors.push(track);
            }
        }
        self.active_tracks = survivors;

        let window = u64::from(self.config.fragmentation_window);
        self.recently_lost.retain(|lost| frame - lost.lost_frame <= window);

        // Step 3: Births from unmatched observations
        for &col in &unmatched_observations {
            let observation = &observations[col];
            let track_id = self.next_track_id;
            self.next_track_id += 1;

            let mut track = Track::new(track_id, observation, frame);
            track.activate();
            events.push(TrackEvent::Created {
                track_id,
                frame,
                object_type: observation.object_type.clone(),
            });

            if let Some(lost_track_id) = self.claim_fragment(&observation.position) {
                events.push(TrackEvent::Fragmentation {
                    lost_track_id,
                    track_id,
                    frame,
                });
            }
            self.active_tracks.push(track);
        }

        if observations.is_empty() {
            events.push(TrackEvent::EmptyFrame { frame });
        }
        events.push(TrackEvent::FrameProcessed { frame });
    }

    /// Consume the nearest recently lost track within tolerance of `position`.
    fn claim_fragment(&mut self, position: &Position) -> Option<u64> {
        let thresh = self.config.localisation_max_diff;
        let (index, _) = self
            .recently_lost
            .iter()
            .enumerate()
            .map(|(i, lost)| (i, lost.position.distance(position)))
            .filter(|(_, d)| *d <= thresh)
            .min_by(|a, b| {
                a.1.total_cmp(&b.1)
                    .then(self.recently_lost[a.0].track_id.cmp(&self.recently_lost[b.0].track_id))
            })?;
        Some(self.recently_lost.remove(index).track_id)
    }
}
