use serde::{Deserialize, Serialize};

/// Track state enumeration for the continuity lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackState {
    /// Created this frame, not yet confirmed
    #[default]
    New,
    /// Matched in the current frame
    Active,
    /// Missed in the current frame but within the occlusion budget
    Occluded,
    /// Occlusion budget exceeded; terminal
    Lost,
}

impl TrackState {
    pub fn is_terminal(self) -> bool {
        self == TrackState::Lost
    }
}
