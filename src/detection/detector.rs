use crate::error::DetectorError;
use crate::events::{EventBus, EyewatchEvent};
use crate::timer::DetectionState;

use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::image_data::{decode_data_uri, decode_grayscale};
use super::RegionClassifier;

/// Minimum eyes inside one face for the frame to count
const REQUIRED_EYES: usize = 2;

/// Result of classifying one submitted frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionOutcome {
    pub eyes_found: bool,
    pub message: String,
}

impl DetectionOutcome {
    fn found() -> Self {
        Self {
            eyes_found: true,
            message: "Eyes detected".to_string(),
        }
    }

    fn not_found() -> Self {
        Self {
            eyes_found: false,
            message: "No eyes detected".to_string(),
        }
    }

    fn failed(error: &DetectorError) -> Self {
        let message = match error {
            DetectorError::InvalidImage => error.to_string(),
            other => format!("Error processing image: {}", other),
        };
        Self {
            eyes_found: false,
            message,
        }
    }
}

/// Face-then-eye pipeline bound to the shared timer state
pub struct EyeDetector {
    classifier: Arc<dyn RegionClassifier>,
    state: Arc<DetectionState>,
    event_bus: Arc<EventBus>,
}

impl EyeDetector {
    pub fn new(
        classifier: Arc<dyn RegionClassifier>,
        state: Arc<DetectionState>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            classifier,
            state,
            event_bus,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Classify a data-URI encoded frame. Never fails: decoding and
    /// classifier errors come back as a negative outcome with a message.
    /// A positive frame refreshes the last-detection time and clears any
    /// running countdown before returning.
    pub fn detect(&self, image_data: &str) -> DetectionOutcome {
        let detection_id = Uuid::new_v4().to_string();

        match self.find_eyes(image_data) {
            Ok(true) => {
                let cleared = self.state.record_detection();
                info!(
                    detection_id = %detection_id,
                    timer_cleared = cleared,
                    "Eyes detected"
                );
                self.event_bus.notify(EyewatchEvent::EyesDetected {
                    detection_id,
                    timestamp: SystemTime::now(),
                });
                DetectionOutcome::found()
            }
            Ok(false) => {
                debug!(detection_id = %detection_id, "No eyes detected");
                DetectionOutcome::not_found()
            }
            Err(e) => {
                warn!(detection_id = %detection_id, "Detection failed: {}", e);
                DetectionOutcome::failed(&e)
            }
        }
    }

    fn find_eyes(&self, image_data: &str) -> Result<bool, DetectorError> {
        let bytes = decode_data_uri(image_data)?;
        let gray = decode_grayscale(&bytes)?;

        let faces = self.classifier.detect_faces(&gray)?;
        debug!(
            "{} face candidates in {}x{} frame",
            faces.len(),
            gray.width(),
            gray.height()
        );

        for face in faces {
            let Some(roi) = face.crop(&gray) else {
                continue;
            };
            let eyes = self.classifier.detect_eyes(&roi)?;
            if eyes.len() >= REQUIRED_EYES {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
