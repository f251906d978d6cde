use crate::events::EyewatchEvent;
use axum::{extract::State, Json};
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

use super::response::{
    ApiError, DetectResponse, HealthResponse, ResetResponse, StatusResponse,
};
use super::server::ServerState;

/// Pull the `image` string out of a JSON request body
pub(crate) fn extract_image(body: &[u8]) -> Result<String, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        debug!("Unparseable detect body: {}", e);
        ApiError::no_image()
    })?;

    match value.get("image") {
        None | Some(Value::Null) => Err(ApiError::no_image()),
        Some(Value::String(image)) => Ok(image.clone()),
        Some(_) => Err(ApiError::ClientInput(
            "Image data must be a string".to_string(),
        )),
    }
}

/// POST /api/detect
pub async fn detect_handler(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<DetectResponse>, ApiError> {
    let image = extract_image(&body)?;
    debug!("Detect request with {} bytes of image data", image.len());

    let detector = Arc::clone(&state.detector);
    let outcome = tokio::task::spawn_blocking(move || detector.detect(&image))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(DetectResponse {
        success: true,
        eyes_detected: outcome.eyes_found,
        message: outcome.message,
        timer_status: state.timer.status(),
    }))
}

/// GET /api/status
pub async fn status_handler(State(state): State<ServerState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        timer_status: state.timer.status(),
    })
}

/// POST /api/reset
pub async fn reset_handler(State(state): State<ServerState>) -> Json<ResetResponse> {
    state.timer.reset();
    info!("Timer reset via API");
    state.event_bus.notify(EyewatchEvent::TimerReset {
        timestamp: SystemTime::now(),
    });

    Json(ResetResponse {
        success: true,
        message: "Timer reset successfully".to_string(),
    })
}

/// GET /health
pub async fn health_handler(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Retina detection server is running".to_string(),
        detector: state.detector.backend_name().to_string(),
        timer_active: state.timer.is_active(),
    })
}
