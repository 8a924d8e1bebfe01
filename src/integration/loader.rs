//! Recording loader: JSON document model and its validation.

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::integration::builder::ObservationBuilder;
use crate::tracker::{EgoSample, Frame, Position, SourceId};
use crate::{Error, Result};

/// A recorded drive: perception frames and, optionally, the ego trajectory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Recording {
    /// Frame rate of the ego samples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ego: Option<EgoRecord>,
    /// Perception frames in increasing index order
    #[serde(default)]
    pub frames: Vec<FrameRecord>,
}

/// Ego localisation samples as parallel arrays.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EgoRecord {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub speed: Vec<f64>,
    pub yaw: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame: u64,
    #[serde(default)]
    pub objects: Vec<ObjectRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Position in metres, `[x, y]` or `[x, y, z]`
    pub position: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceId>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

/// Load and validate a recording from a JSON file.
pub fn load_recording(path: &Path) -> Result<Recording> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let recording: Recording = serde_json::from_reader(reader)?;
    recording.validate()?;
    tracing::debug!(
        path = %path.display(),
        frames = recording.frames.len(),
        ego_samples = recording.ego.as_ref().map_or(0, |e| e.x.len()),
        "recording loaded"
    );
    Ok(recording)
}

impl Recording {
    /// Parse and validate a recording from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let recording: Recording = serde_json::from_str(json)?;
        recording.validate()?;
        Ok(recording)
    }

    /// Check the whole document before any evaluation state exists.
    pub fn validate(&self) -> Result<()> {
        self.frames()?;
        self.ego_samples()?;
        Ok(())
    }

    /// Convert the perception records into engine frames.
    ///
    /// Fails on non-increasing frame indices, malformed positions and on
    /// a mix of 2D and 3D positions.
    pub fn frames(&self) -> Result<Vec<Frame>> {
        let mut frames = Vec::with_capacity(self.frames.len());
        let mut previous: Option<u64> = None;
        let mut dims: Option<usize> = None;

        for record in &self.frames {
            if let Some(previous) = previous {
                if record.frame <= previous {
                    return Err(Error::NonMonotonicFrame {
                        previous,
                        current: record.frame,
                    });
                }
            }
            previous = Some(record.frame);

            let mut observations = Vec::with_capacity(record.objects.len());
            for (index, object) in record.objects.iter().enumerate() {
                let invalid = |reason: String| Error::InvalidObservation {
                    frame: record.frame,
                    index,
                    reason,
                };
                let position = Position::from_slice(&object.position).ok_or_else(|| {
                    invalid(format!(
                        "position must hold 2 or 3 finite coordinates, got {:?}",
                        object.position
                    ))
                })?;
                if let Some(expected) = dims {
                    if expected != position.dims() {
                        return Err(invalid(format!(
                            "{}D position in a {}D recording",
                            position.dims(),
                            expected
                        )));
                    }
                }
                dims = Some(position.dims());

                let mut builder = ObservationBuilder::new().position(position);
                if let Some(id) = &object.id {
                    builder = builder.source_id(id.clone());
                }
                if let Some(object_type) = &object.object_type {
                    builder = builder.object_type(object_type.clone());
                }
                observations.push(builder.build());
            }
            frames.push(Frame::new(record.frame, observations));
        }
        Ok(frames)
    }

    /// Ego samples and their frame rate, if the recording carries an ego track.
    pub fn ego_samples(&self) -> Result<Option<(Vec<EgoSample>, f64)>> {
        let Some(ego) = &self.ego else {
            return Ok(None);
        };
        let fps = match self.fps {
            Some(fps) if fps.is_finite() && fps > 0.0 => fps,
            Some(fps) => return Err(Error::InvalidEgo(format!("fps must be positive, got {fps}"))),
            None => return Err(Error::InvalidEgo("fps is required with an ego track".to_string())),
        };

        let len = ego.x.len();
        for (field, values) in [("y", &ego.y), ("speed", &ego.speed), ("yaw", &ego.yaw)] {
            if values.len() != len {
                return Err(Error::InvalidEgo(format!(
                    "field `{field}` has {} samples, `x` has {len}",
                    values.len()
                )));
            }
        }

        let samples: Vec<EgoSample> = (0..len)
            .map(|i| EgoSample::new(ego.x[i], ego.y[i], ego.speed[i], ego.yaw[i]))
            .collect();
        if let Some(i) = samples
            .iter()
            .position(|s| ![s.x, s.y, s.speed, s.yaw].iter().all(|v| v.is_finite()))
        {
            return Err(Error::InvalidEgo(format!("sample {i} has non-finite values")));
        }
        Ok(Some((samples, fps)))
    }
}
