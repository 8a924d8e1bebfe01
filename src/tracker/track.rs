//! Persistent track identity and its lifecycle transitions.

use crate::tracker::observation::{Observation, SourceId};
use crate::tracker::position::Position;
use crate::tracker::track_state::TrackState;

const UNKNOWN_OBJECT_TYPE: &str = "UNKNOWN";

/// Something that happened to a track (or the sequence) during one frame.
///
/// The engine emits these in processing order; the aggregator folds them
/// into the final result.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEvent {
    /// A track was born from an unmatched observation.
    Created {
        track_id: u64,
        frame: u64,
        object_type: Option<String>,
    },
    /// An existing track was matched to an observation.
    Matched {
        track_id: u64,
        frame: u64,
        distance: f64,
    },
    /// An occluded track was matched again.
    Recovered {
        track_id: u64,
        frame: u64,
        occluded_frames: u32,
    },
    /// A track missed a frame but stays within its occlusion budget.
    Occluded {
        track_id: u64,
        frame: u64,
        frames_occluded: u32,
    },
    /// A track exceeded its occlusion budget and was finalized.
    Lost {
        track_id: u64,
        frame: u64,
        last_seen: u64,
    },
    /// The upstream identifier attached to a track changed between matches.
    IdentitySwitch {
        track_id: u64,
        frame: u64,
        previous: SourceId,
        current: SourceId,
    },
    /// A new track was born close to a recently lost one.
    Fragmentation {
        lost_track_id: u64,
        track_id: u64,
        frame: u64,
    },
    /// The object class attached to a track changed.
    ClassSwitch {
        track_id: u64,
        frame: u64,
        previous: String,
        current: String,
    },
    /// A track without a concrete object class received one.
    TypeAssigned { track_id: u64, object_type: String },
    /// A frame, explicit or skipped, carried no observations.
    EmptyFrame { frame: u64 },
    /// A frame finished processing.
    FrameProcessed { frame: u64 },
    /// `count` consecutive frame indices from `first` were skipped by the
    /// input. Each counts as an empty, processed frame.
    SkippedFrames { first: u64, count: u64 },
}

fn is_unknown(object_type: &str) -> bool {
    object_type.eq_ignore_ascii_case(UNKNOWN_OBJECT_TYPE)
}

/// Single tracked object.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track identifier, never reused within a run
    pub track_id: u64,
    /// Current lifecycle state
    pub state: TrackState,
    /// Last known position
    pub position: Position,
    /// Frame the track was born in
    pub start_frame: u64,
    /// Last frame the track was observed in
    pub frame_id: u64,
    /// Consecutive frames without a match
    pub frames_occluded: u32,
    /// Frames spent occluded over the whole lifespan
    pub total_frames_occluded: u32,
    /// Number of observations attached to the track
    pub hits: u32,
    /// Upstream identifier of the last attached observation that had one
    pub source_id: Option<SourceId>,
    /// Object class, first concrete value observed
    pub object_type: Option<String>,
}

impl Track {
    /// Create a new track from an observation, in state `New`.
    pub fn new(track_id: u64, observation: &Observation, frame_id: u64) -> Self {
        Self {
            track_id,
            state: TrackState::New,
            position: observation.position,
            start_frame: frame_id,
            frame_id,
            frames_occluded: 0,
            total_frames_occluded: 0,
            hits: 1,
            source_id: observation.source_id.clone(),
            object_type: observation.object_type.clone(),
        }
    }

    pub fn is_lost(&self) -> bool {
        self.state.is_terminal()
    }

    /// Confirm a freshly created track: it has a current-frame position.
    pub fn activate(&mut self) {
        debug_assert_eq!(self.state, TrackState::New);
        self.state = TrackState::Active;
    }

    /// Attach an observation to the track and record the resulting events.
    pub fn mark_matched(
        &mut self,
        observation: &Observation,
        frame_id: u64,
        distance: f64,
        events: &mut Vec<TrackEvent>,
    ) {
        debug_assert!(!self.is_lost(), "lost track {} matched", self.track_id);

        events.push(TrackEvent::Matched {
            track_id: self.track_id,
            frame: frame_id,
            distance,
        });

        if self.state == TrackState::Occluded {
            events.push(TrackEvent::Recovered {
                track_id: self.track_id,
                frame: frame_id,
                occluded_frames: self.frames_occluded,
            });
        }

        if let Some(current) = &observation.source_id {
            if let Some(previous) = &self.source_id {
                if previous != current {
                    events.push(TrackEvent::IdentitySwitch {
                        track_id: self.track_id,
                        frame: frame_id,
                        previous: previous.clone(),
                        current: current.clone(),
                    });
                }
            }
            self.source_id = Some(current.clone());
        }

        if let Some(current) = &observation.object_type {
            self.observe_object_type(current, frame_id, events);
        }

        self.position = observation.position;
        self.frame_id = frame_id;
        self.frames_occluded = 0;
        self.hits += 1;
        self.state = TrackState::Active;
    }

    fn observe_object_type(&mut self, current: &str, frame_id: u64, events: &mut Vec<TrackEvent>) {
        match self.object_type.as_deref() {
            Some(previous) if is_unknown(previous) && !is_unknown(current) => {
                self.assign_object_type(current, events);
            }
            Some(previous) if previous != current && !is_unknown(current) => {
                events.push(TrackEvent::ClassSwitch {
                    track_id: self.track_id,
                    frame: frame_id,
                    previous: previous.to_string(),
                    current: current.to_string(),
                });
            }
            Some(_) => {}
            None => self.assign_object_type(current, events),
        }
    }

    fn assign_object_type(&mut self, object_type: &str, events: &mut Vec<TrackEvent>) {
        self.object_type = Some(object_type.to_string());
        events.push(TrackEvent::TypeAssigned {
            track_id: self.track_id,
            object_type: object_type.to_string(),
        });
    }

    /// Record a frame without a match.
    ///
    /// The track becomes `Occluded` while its consecutive miss count stays
    /// within `max_occluded_frames`, and `Lost` as soon as it exceeds it.
    pub fn mark_missed(&mut self, frame_id: u64, max_occluded_frames: u32) -> TrackEvent {
        debug_assert!(!self.is_lost(), "lost track {} missed", self.track_id);

        self.frames_occluded += 1;
        if self.frames_occluded > max_occluded_frames {
            self.state = TrackState::Lost;
            TrackEvent::Lost {
                track_id: self.track_id,
                frame: frame_id,
                last_seen: self.frame_id,
            }
        } else {
            self.state = TrackState::Occluded;
            self.total_frames_occluded += 1;
            TrackEvent::Occluded {
                track_id: self.track_id,
                frame: frame_id,
                frames_occluded: self.frames_occluded,
            }
        }
    }

    /// Record `count` consecutive frames without a match, starting at `first`.
    ///
    /// Same outcome as calling [`mark_missed`](Self::mark_missed) once per
    /// frame, but only the final transitions are reported: at most one
    /// `Occluded` event carrying the consecutive miss count, then `Lost` if
    /// the run exceeds the budget. Returns the frame the track was lost in.
    pub fn mark_missed_run(
        &mut self,
        first: u64,
        count: u64,
        max_occluded_frames: u32,
        events: &mut Vec<TrackEvent>,
    ) -> Option<u64> {
        debug_assert!(!self.is_lost(), "lost track {} missed", self.track_id);

        let survivable = max_occluded_frames.saturating_sub(self.frames_occluded);
        let occluded = u32::try_from(count).map_or(survivable, |count| count.min(survivable));
        if occluded > 0 {
            self.frames_occluded += occluded;
            self.total_frames_occluded = self.total_frames_occluded.saturating_add(occluded);
            self.state = TrackState::Occluded;
            events.push(TrackEvent::Occluded {
                track_id: self.track_id,
                frame: first + u64::from(occluded) - 1,
                frames_occluded: self.frames_occluded,
            });
        }

        if count <= u64::from(occluded) {
            return None;
        }
        let lost_frame = first + u64::from(occluded);
        self.frames_occluded = self.frames_occluded.saturating_add(1);
        self.state = TrackState::Lost;
        events.push(TrackEvent::Lost {
            track_id: self.track_id,
            frame: lost_frame,
            last_seen: self.frame_id,
        });
        Some(lost_frame)
    }
}
