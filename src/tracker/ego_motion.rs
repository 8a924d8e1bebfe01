//! Dead-reckoning consistency check of the ego vehicle trajectory.
//!
//! Each sample is predicted from the previous one with a constant speed and
//! heading over one frame period. Samples whose actual position lands more
//! than the localisation tolerance away from the prediction are reported.

use std::collections::BTreeMap;

use nalgebra::Vector2;

/// One ego localisation sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgoSample {
    pub x: f64,
    pub y: f64,
    /// Speed in m/s
    pub speed: f64,
    /// Heading in radians
    pub yaw: f64,
}

impl EgoSample {
    pub fn new(x: f64, y: f64, speed: f64, yaw: f64) -> Self {
        Self { x, y, speed, yaw }
    }

    fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Position expected one frame period after this sample.
    pub fn predict(&self, fps: f64) -> Vector2<f64> {
        let dt = 1.0 / fps;
        let heading = Vector2::new(self.yaw.cos(), self.yaw.sin());
        self.position() + heading * (self.speed * dt)
    }

    /// Distance between this sample and the prediction made from `previous`.
    pub fn prediction_error(&self, previous: &EgoSample, fps: f64) -> f64 {
        (self.position() - previous.predict(fps)).norm()
    }
}

fn round_centimetres(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sample indices whose prediction error exceeds `max_diff`, with the error
/// in metres rounded to two decimals.
///
/// `fps` must be positive; callers validate it before getting here.
pub fn localisation_anomalies(samples: &[EgoSample], fps: f64, max_diff: f64) -> BTreeMap<usize, f64> {
    samples
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let error = pair[1].prediction_error(&pair[0], fps);
            (error > max_diff).then(|| (i + 1, round_centimetres(error)))
        })
        .collect()
}
