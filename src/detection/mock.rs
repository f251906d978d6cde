use crate::error::DetectorError;
use image::GrayImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

use super::{Region, RegionClassifier};

/// Scripted classifier for running without OpenCV.
///
/// Each scripted face carries the number of eyes to report for it. Eye
/// lookups match the cropped face back to its script entry by size, so give
/// every face in a script distinct dimensions.
#[derive(Default)]
pub struct MockClassifier {
    faces: Vec<(Region, usize)>,
    failure: Option<String>,
    eye_calls: AtomicUsize,
}

impl MockClassifier {
    /// Classifier that never finds a face
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a face that will report `eye_count` eyes
    pub fn with_face(mut self, region: Region, eye_count: usize) -> Self {
        self.faces.push((region, eye_count));
        self
    }

    /// Make every call fail with the given reason
    pub fn failing<S: Into<String>>(mut self, reason: S) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// How many eye lookups have been made so far
    pub fn eye_calls(&self) -> usize {
        self.eye_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), DetectorError> {
        match &self.failure {
            Some(reason) => Err(DetectorError::Classifier {
                details: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl RegionClassifier for MockClassifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn detect_faces(&self, gray: &GrayImage) -> Result<Vec<Region>, DetectorError> {
        self.check_failure()?;
        let faces: Vec<Region> = self.faces.iter().map(|(region, _)| *region).collect();
        debug!(
            "Mock classifier reporting {} faces for {}x{} frame",
            faces.len(),
            gray.width(),
            gray.height()
        );
        Ok(faces)
    }

    fn detect_eyes(&self, face: &GrayImage) -> Result<Vec<Region>, DetectorError> {
        self.check_failure()?;
        self.eye_calls.fetch_add(1, Ordering::SeqCst);

        let (width, height) = face.dimensions();
        let eye_count = self
            .faces
            .iter()
            .find(|(region, _)| region.width == width && region.height == height)
            .map(|(_, count)| *count)
            .unwrap_or(0);

        let eye_width = (width / 4).max(1);
        let eye_height = (height / 6).max(1);
        Ok((0..eye_count as u32)
            .map(|i| Region::new((i * eye_width) % width, height / 4, eye_width, eye_height))
            .collect())
    }
}
