//! Per-frame input records for the continuity engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tracker::position::Position;

/// Identifier attached to an observation by the upstream perception stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceId {
    Int(i64),
    Str(String),
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for SourceId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

/// One detected object instance in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Localised position in metres
    pub position: Position,
    /// Identifier from the upstream tracker, if any
    pub source_id: Option<SourceId>,
    /// Object class reported by perception (e.g. "CAR")
    pub object_type: Option<String>,
}

impl Observation {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            source_id: None,
            object_type: None,
        }
    }

    pub fn with_source_id(mut self, source_id: impl Into<SourceId>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }
}

/// All observations recorded at one frame index.
///
/// An observation's frame-local index is its position in `observations`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub index: u64,
    pub observations: Vec<Observation>,
}

impl Frame {
    pub fn new(index: u64, observations: Vec<Observation>) -> Self {
        Self {
            index,
            observations,
        }
    }

    pub fn empty(index: u64) -> Self {
        Self::new(index, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
