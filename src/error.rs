use thiserror::Error;

#[derive(Error, Debug)]
pub enum EyewatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("System error: {message}")]
    System { message: String },
}

impl EyewatchError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

/// Failures inside the detection pipeline. These never leave the detector as
/// errors; they are folded into the detection message.
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("image data has no payload after the data URI prefix")]
    MissingPayload,

    #[error("{0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid image data")]
    InvalidImage,

    #[error("failed to load cascade classifier {path}: {details}")]
    CascadeLoad { path: String, details: String },

    #[error("classifier failure: {details}")]
    Classifier { details: String },

    #[error("detector backend '{backend}' is unavailable: {details}")]
    BackendUnavailable { backend: String, details: String },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    BindFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server startup failed: {details}")]
    StartupFailed { details: String },
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("failed to publish event: {details}")]
    PublishFailed { details: String },
}

pub type Result<T> = std::result::Result<T, EyewatchError>;
