pub mod annotate;
pub mod bbox;
pub mod cache;
pub mod detection;
pub mod detector;
pub mod error;
pub mod interpolate;
pub mod pipeline;
pub mod tracks;

pub use annotate::{Annotator, AnnotatorConfig};
pub use bbox::BBox;
pub use detection::{ClassMap, Detection, DetectionBatch, TrackedDetection};
pub use detector::{BatchedDetector, Detector, DetectorConfig};
pub use error::Error;
pub use interpolate::interpolate_ball;
pub use pipeline::TrackPipeline;
pub use tracks::{Color, FrameTracks, TrackEntry, TrackId, TrackStore, BALL_TRACK_ID};

/// Video frame pixels, height x width x RGB.
pub type Frame = image::RgbImage;

/// Stateful cross-frame identity assignment capability.
///
/// One instance covers one video: `update` must be invoked exactly once
/// per frame, in frame order, from a single thread, and never reset
/// between frames. Out-of-order or concurrent use corrupts identity
/// continuity.
pub trait IdentityTracker {
    /// Drop all cross-frame state, ready for a new video.
    fn reset(&mut self);

    /// Annotate one frame's detections with stable track identifiers.
    fn update(&mut self, detections: &[Detection]) -> Result<Vec<TrackedDetection>, Error>;
}
