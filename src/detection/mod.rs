mod classifier;
mod detector;
#[cfg(feature = "cascade")]
mod haar;
mod image_data;
mod mock;
mod region;
#[cfg(test)]
mod tests;

pub use classifier::RegionClassifier;
pub use detector::{DetectionOutcome, EyeDetector};
#[cfg(feature = "cascade")]
pub use haar::HaarCascadeClassifier;
pub use image_data::{decode_data_uri, decode_grayscale};
pub use mock::MockClassifier;
pub use region::Region;

use crate::config::{DetectorBackend, DetectorConfig};
use crate::error::DetectorError;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the classifier selected in the detector configuration
pub fn build_classifier(
    config: &DetectorConfig,
) -> Result<Arc<dyn RegionClassifier>, DetectorError> {
    match config.backend {
        DetectorBackend::Mock => {
            warn!("Using mock classifier, no faces will ever be detected");
            Ok(Arc::new(MockClassifier::new()))
        }
        DetectorBackend::Cascade => build_cascade(config),
    }
}

#[cfg(feature = "cascade")]
fn build_cascade(config: &DetectorConfig) -> Result<Arc<dyn RegionClassifier>, DetectorError> {
    let classifier = HaarCascadeClassifier::load(config)?;
    info!("Haar cascade classifier ready");
    Ok(Arc::new(classifier))
}

#[cfg(not(feature = "cascade"))]
fn build_cascade(config: &DetectorConfig) -> Result<Arc<dyn RegionClassifier>, DetectorError> {
    info!(
        "Cascade backend requested for {} but support is not compiled in",
        config.face_cascade_path
    );
    Err(DetectorError::BackendUnavailable {
        backend: "cascade".to_string(),
        details: "rebuild with `--features cascade` or set detector.backend = \"mock\""
            .to_string(),
    })
}
