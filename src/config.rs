use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EyewatchConfig {
    pub server: ServerConfig,
    pub detector: DetectorConfig,
    pub timer: TimerConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind to
    #[serde(default = "default_server_ip")]
    pub ip: String,

    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Largest request body accepted by the API
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    /// OpenCV Haar cascades (requires the `cascade` feature)
    Cascade,
    /// Scripted classifier that never finds a face
    Mock,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DetectorConfig {
    /// Which classifier implementation to run
    #[serde(default = "default_detector_backend")]
    pub backend: DetectorBackend,

    /// Path to the frontal face Haar cascade XML
    #[serde(default = "default_face_cascade_path")]
    pub face_cascade_path: String,

    /// Path to the eye Haar cascade XML
    #[serde(default = "default_eye_cascade_path")]
    pub eye_cascade_path: String,

    /// Image pyramid scale step for face detection
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// Neighbouring detections required to keep a face candidate
    #[serde(default = "default_min_neighbors")]
    pub min_neighbors: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TimerConfig {
    /// Countdown length before the alert fires
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: u64,

    /// Seconds without eyes before the countdown starts
    #[serde(default = "default_detection_threshold_seconds")]
    pub detection_threshold_seconds: u64,

    /// Monitor tick period in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl TimerConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    pub fn detection_threshold(&self) -> Duration {
        Duration::from_secs(self.detection_threshold_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl EyewatchConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("eyewatch.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("server.ip", default_server_ip())?
            .set_default("server.port", default_server_port() as u64)?
            .set_default("server.max_body_bytes", default_max_body_bytes() as u64)?
            .set_default("detector.backend", "cascade")?
            .set_default("detector.face_cascade_path", default_face_cascade_path())?
            .set_default("detector.eye_cascade_path", default_eye_cascade_path())?
            .set_default("detector.scale_factor", default_scale_factor())?
            .set_default("detector.min_neighbors", default_min_neighbors())?
            .set_default("timer.duration_seconds", default_duration_seconds())?
            .set_default(
                "timer.detection_threshold_seconds",
                default_detection_threshold_seconds(),
            )?
            .set_default("timer.poll_interval_ms", default_poll_interval_ms())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as u64,
            )?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with EYEWATCH_ prefix
            .add_source(
                Environment::with_prefix("EYEWATCH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: EyewatchConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Message(
                "Server max_body_bytes must be greater than 0".to_string(),
            ));
        }

        if self.detector.scale_factor <= 1.0 {
            return Err(ConfigError::Message(
                "Detector scale_factor must be greater than 1.0".to_string(),
            ));
        }

        if self.detector.min_neighbors < 0 {
            return Err(ConfigError::Message(
                "Detector min_neighbors must not be negative".to_string(),
            ));
        }

        if self.timer.duration_seconds == 0 {
            return Err(ConfigError::Message(
                "Timer duration_seconds must be greater than 0".to_string(),
            ));
        }

        if self.timer.poll_interval_ms == 0 {
            return Err(ConfigError::Message(
                "Timer poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for EyewatchConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                ip: default_server_ip(),
                port: default_server_port(),
                max_body_bytes: default_max_body_bytes(),
            },
            detector: DetectorConfig {
                backend: default_detector_backend(),
                face_cascade_path: default_face_cascade_path(),
                eye_cascade_path: default_eye_cascade_path(),
                scale_factor: default_scale_factor(),
                min_neighbors: default_min_neighbors(),
            },
            timer: TimerConfig {
                duration_seconds: default_duration_seconds(),
                detection_threshold_seconds: default_detection_threshold_seconds(),
                poll_interval_ms: default_poll_interval_ms(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

// Default value functions
fn default_server_ip() -> String {
    "0.0.0.0".to_string()
}
fn default_server_port() -> u16 {
    8001
}
fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_detector_backend() -> DetectorBackend {
    DetectorBackend::Cascade
}
fn default_face_cascade_path() -> String {
    "/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml".to_string()
}
fn default_eye_cascade_path() -> String {
    "/usr/share/opencv4/haarcascades/haarcascade_eye.xml".to_string()
}
fn default_scale_factor() -> f64 {
    1.3
}
fn default_min_neighbors() -> i32 {
    5
}

fn default_duration_seconds() -> u64 {
    300
}
fn default_detection_threshold_seconds() -> u64 {
    2
}
fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_event_bus_capacity() -> usize {
    100
}
