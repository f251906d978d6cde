use super::types::{ComponentState, ShutdownReason};
use crate::api::{ApiServer, ServerState};
use crate::config::EyewatchConfig;
use crate::detection::{build_classifier, EyeDetector, RegionClassifier};
use crate::error::Result;
use crate::events::EventBus;
use crate::timer::{DetectionState, TimerMonitor};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub(super) const MONITOR: &str = "timer_monitor";
pub(super) const API_SERVER: &str = "api_server";
pub(super) const EVENT_LOG: &str = "event_log";

/// Main application coordinator that owns the shared state and every task
pub struct EyewatchOrchestrator {
    pub(super) config: EyewatchConfig,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) state: Arc<DetectionState>,
    pub(super) detector: Arc<EyeDetector>,

    // Components
    pub(super) monitor: TimerMonitor,
    pub(super) api_server: Arc<ApiServer>,
    pub(super) server_task: Option<JoinHandle<()>>,
    pub(super) event_log_task: Option<JoinHandle<()>>,

    // Lifecycle management
    pub(super) component_states: Arc<Mutex<HashMap<String, ComponentState>>>,
    pub(super) shutdown_sender: Option<oneshot::Sender<ShutdownReason>>,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) cancellation_token: CancellationToken,
}

impl EyewatchOrchestrator {
    /// Create an orchestrator with the classifier named in the configuration
    pub async fn new(config: EyewatchConfig) -> Result<Self> {
        let classifier = build_classifier(&config.detector)?;
        Ok(Self::with_classifier(config, classifier))
    }

    /// Create an orchestrator around an already constructed classifier
    pub fn with_classifier(config: EyewatchConfig, classifier: Arc<dyn RegionClassifier>) -> Self {
        info!("Using '{}' classifier backend", classifier.name());

        let event_bus = Arc::new(EventBus::new(config.system.event_bus_capacity));
        let state = Arc::new(DetectionState::from_config(&config.timer));
        let detector = Arc::new(EyeDetector::new(
            classifier,
            Arc::clone(&state),
            Arc::clone(&event_bus),
        ));

        let monitor = TimerMonitor::new(
            Arc::clone(&state),
            Arc::clone(&event_bus),
            config.timer.poll_interval(),
        );

        let api_server = Arc::new(ApiServer::new(
            config.server.clone(),
            ServerState::new(
                Arc::clone(&detector),
                Arc::clone(&state),
                Arc::clone(&event_bus),
            ),
        ));

        let (shutdown_sender, shutdown_receiver) = oneshot::channel();

        Self {
            config,
            event_bus,
            state,
            detector,
            monitor,
            api_server,
            server_task: None,
            event_log_task: None,
            component_states: Arc::new(Mutex::new(HashMap::new())),
            shutdown_sender: Some(shutdown_sender),
            shutdown_receiver: Some(shutdown_receiver),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &EyewatchConfig {
        &self.config
    }

    pub fn detection_state(&self) -> Arc<DetectionState> {
        Arc::clone(&self.state)
    }

    pub fn detector(&self) -> Arc<EyeDetector> {
        Arc::clone(&self.detector)
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }
}
