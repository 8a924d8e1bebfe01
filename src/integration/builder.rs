//! Builder for creating Observation objects from various input formats.

use crate::tracker::{Observation, Position, SourceId};

/// Builder for creating `Observation` objects from various input formats.
#[derive(Debug, Clone)]
pub struct ObservationBuilder {
    position: Position,
    source_id: Option<SourceId>,
    object_type: Option<String>,
}

impl Default for ObservationBuilder {
    fn default() -> Self {
        Self {
            position: Position::from_xy(0.0, 0.0),
            source_id: None,
            object_type: None,
        }
    }
}

impl ObservationBuilder {
    /// Create a new observation builder at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a planar position in metres.
    pub fn xy(mut self, x: f64, y: f64) -> Self {
        self.position = Position::from_xy(x, y);
        self
    }

    /// Set a 3D position in metres.
    pub fn xyz(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = Position::from_xyz(x, y, z);
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set the identifier assigned by the upstream tracker.
    pub fn source_id(mut self, source_id: impl Into<SourceId>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Set the object class reported by perception.
    pub fn object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    /// Build the final `Observation`.
    pub fn build(self) -> Observation {
        Observation {
            position: self.position,
            source_id: self.source_id,
            object_type: self.object_type,
        }
    }
}
