pub mod api;
pub mod app;
pub mod config;
pub mod detection;
pub mod error;
pub mod events;
pub mod timer;

#[cfg(test)]
mod test_support;

pub use api::{ApiError, ApiServer, ServerState};
pub use app::{ComponentState, EyewatchOrchestrator, ShutdownReason};
pub use config::{DetectorBackend, EyewatchConfig};
pub use detection::{
    build_classifier, DetectionOutcome, EyeDetector, MockClassifier, Region, RegionClassifier,
};
pub use error::{DetectorError, EyewatchError, Result};
pub use events::{EventBus, EyewatchEvent};
pub use timer::{DetectionState, TimerMonitor, TimerStatus};
