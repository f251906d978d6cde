use crate::error::DetectorError;
use image::GrayImage;

use super::Region;

/// Pretrained region detectors used by the eye pipeline
pub trait RegionClassifier: Send + Sync {
    /// Short backend name for logs and the health endpoint
    fn name(&self) -> &'static str;

    /// Candidate face boxes in a full grayscale frame
    fn detect_faces(&self, gray: &GrayImage) -> Result<Vec<Region>, DetectorError>;

    /// Eye boxes inside a cropped face region
    fn detect_eyes(&self, face: &GrayImage) -> Result<Vec<Region>, DetectorError>;
}
