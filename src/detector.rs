use crate::detection::DetectionBatch;
use crate::error::Error;
use crate::Frame;

/// Opaque frame detection capability. Implementations wrap whatever model
/// backend is in use; one call covers a slice of frames and returns one
/// batch per frame, order preserved.
pub trait Detector {
    fn detect(
        &mut self,
        frames: &[Frame],
        confidence_threshold: f32,
    ) -> Result<Vec<DetectionBatch>, Error>;
}

pub struct DetectorConfig {
    /// Permissive on purpose, downstream track matching rejects the noise.
    pub confidence_threshold: f32,
    /// Frames handed to the model per call, bounds peak memory only.
    pub batch_size: usize,
}

impl DetectorConfig {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
            batch_size: 20,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new(0.1)
    }
}

/// Runs a [`Detector`] over a whole video in fixed-size chunks. Chunking
/// never changes per-frame results or their order.
pub struct BatchedDetector<D: Detector> {
    detector: D,
    config: DetectorConfig,
}

impl<D: Detector> BatchedDetector<D> {
    pub fn new(detector: D, config: DetectorConfig) -> Self {
        Self { detector, config }
    }

    pub fn detect(&mut self, frames: &[Frame]) -> Result<Vec<DetectionBatch>, Error> {
        let chunk_size = self.config.batch_size.max(1);
        let mut batches = Vec::with_capacity(frames.len());

        for chunk in frames.chunks(chunk_size) {
            let mut out = self
                .detector
                .detect(chunk, self.config.confidence_threshold)?;

            if out.len() != chunk.len() {
                return Err(Error::detector(format!(
                    "returned {} batches for {} frames",
                    out.len(),
                    chunk.len()
                )));
            }

            log::debug!("detected chunk of {} frames", chunk.len());
            batches.append(&mut out);
        }

        Ok(batches)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn inner(&self) -> &D {
        &self.detector
    }

    pub fn into_inner(self) -> D {
        self.detector
    }
}
