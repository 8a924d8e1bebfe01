//! Trait for frame sequence providers.

use std::convert::Infallible;

use crate::tracker::Frame;

/// Trait for frame sequence providers.
///
/// Implement this trait to feed the continuity engine from any source.
/// Frames must come out in strictly increasing index order.
///
/// # Example
///
/// ```ignore
/// use trackeval_rs::{Frame, FrameSource};
///
/// struct LiveFeed {
///     // Your perception stack here
/// }
///
/// impl FrameSource for LiveFeed {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
///         // Return the next frame, or None once the sequence ends
///         Ok(None)
///     }
/// }
/// ```
pub trait FrameSource {
    /// Error type for frame retrieval failures.
    type Error;

    /// Return the next frame, or `None` once the sequence is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;
}

/// Frames already held in memory, e.g. from a validated recording.
#[derive(Debug, Clone)]
pub struct InMemoryFrames {
    frames: std::vec::IntoIter<Frame>,
}

impl InMemoryFrames {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl From<Vec<Frame>> for InMemoryFrames {
    fn from(frames: Vec<Frame>) -> Self {
        Self::new(frames)
    }
}

impl FrameSource for InMemoryFrames {
    type Error = Infallible;

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        Ok(self.frames.next())
    }
}
