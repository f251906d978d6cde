use crate::timer::TimerStatus;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Request failures surfaced to API callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing or malformed request payload (400)
    ClientInput(String),
    /// Unexpected failure while serving the request (500)
    Internal(String),
}

impl ApiError {
    pub fn no_image() -> Self {
        ApiError::ClientInput("No image data provided".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ClientInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::ClientInput(message) => message.clone(),
            ApiError::Internal(details) => format!("Server error: {}", details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::ClientInput(message) => warn!("Rejected request: {}", message),
            ApiError::Internal(details) => error!("Request failed: {}", details),
        }

        let body = ErrorResponse {
            success: false,
            message: self.message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectResponse {
    pub success: bool,
    pub eyes_detected: bool,
    pub message: String,
    pub timer_status: TimerStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub timer_status: TimerStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub detector: String,
    pub timer_active: bool,
}
