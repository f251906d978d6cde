use crate::{
    config::ServerConfig,
    detection::EyeDetector,
    error::{Result, ServerError},
    events::EventBus,
    timer::DetectionState,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::handlers::{detect_handler, health_handler, reset_handler, status_handler};

/// Shared state for the Axum server
#[derive(Clone)]
pub struct ServerState {
    pub(crate) detector: Arc<EyeDetector>,
    pub(crate) timer: Arc<DetectionState>,
    pub(crate) event_bus: Arc<EventBus>,
}

impl ServerState {
    pub fn new(
        detector: Arc<EyeDetector>,
        timer: Arc<DetectionState>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            detector,
            timer,
            event_bus,
        }
    }
}

/// Build the API router. Any origin may call it.
pub fn router(state: ServerState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/detect", post(detect_handler))
        .route("/api/status", get(status_handler))
        .route("/api/reset", post(reset_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server exposing detection, timer status and reset
pub struct ApiServer {
    pub(crate) config: ServerConfig,
    pub(crate) state: ServerState,
}

impl ApiServer {
    pub fn new(config: ServerConfig, state: ServerState) -> Self {
        Self { config, state }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.config.ip, self.config.port)
    }

    /// Bind the listening socket
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.address();
        info!("Starting API server on {}", addr);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::BindFailed {
                address: addr.clone(),
                source: e,
            })?;

        info!("API server listening on {}", addr);
        info!("  POST /api/detect - Detect eyes in image");
        info!("  GET  /api/status - Get timer status");
        info!("  POST /api/reset  - Reset timer");
        info!("  GET  /health     - Health check");

        Ok(listener)
    }

    /// Serve requests on a bound listener until `shutdown` is cancelled
    pub async fn serve(&self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        let app = router(self.state.clone(), self.config.max_body_bytes);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| ServerError::StartupFailed {
                details: format!("Server error: {}", e),
            })?;

        info!("API server on {} stopped", self.address());
        Ok(())
    }
}
