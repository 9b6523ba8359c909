use crate::landmarks::domain::capture_error::CaptureError;
use crate::shared::landmark_frame::LandmarkFrame;

/// Outcome of one pull from a landmark source.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// A face was detected with sufficient confidence.
    Face(LandmarkFrame),
    /// No usable face this cycle.
    NoFace,
    /// The user asked to quit, or the stream ended.
    Quit,
}

/// Domain interface for anything that produces facial landmark frames.
///
/// Pull-based: the frame loop calls `next_frame` once per cycle and may
/// block until the next frame is available.
pub trait LandmarkSource: Send {
    fn next_frame(&mut self) -> Result<SourceEvent, CaptureError>;
}
