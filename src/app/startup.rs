use super::orchestrator::{API_SERVER, EVENT_LOG, MONITOR};
use super::{ComponentState, EyewatchOrchestrator};
use crate::error::Result;
use crate::events::{EventBus, EyewatchEvent};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

impl EyewatchOrchestrator {
    /// Initialize all system components
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing eyewatch components");

        let mut states = self.component_states.lock().await;
        states.insert(EVENT_LOG.to_string(), ComponentState::Stopped);
        states.insert(MONITOR.to_string(), ComponentState::Stopped);
        states.insert(API_SERVER.to_string(), ComponentState::Stopped);
        drop(states);

        info!("All components initialized successfully");
        Ok(())
    }

    /// Start the event log, the timer monitor and the API server.
    /// The listening socket is bound before this returns.
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting eyewatch");

        self.set_component_state(EVENT_LOG, ComponentState::Starting)
            .await;
        self.event_log_task = Some(spawn_event_log(
            Arc::clone(&self.event_bus),
            self.cancellation_token.clone(),
        ));
        debug!(
            "Event log attached, {} bus subscriber(s)",
            self.event_bus.subscriber_count()
        );
        self.set_component_state(EVENT_LOG, ComponentState::Running)
            .await;

        self.set_component_state(MONITOR, ComponentState::Starting)
            .await;
        self.monitor.start(self.cancellation_token.clone());
        self.set_component_state(MONITOR, ComponentState::Running)
            .await;

        self.set_component_state(API_SERVER, ComponentState::Starting)
            .await;
        let listener = match self.api_server.bind().await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to start API server: {}", e);
                self.set_component_state(API_SERVER, ComponentState::Failed)
                    .await;
                return Err(e);
            }
        };

        let server = Arc::clone(&self.api_server);
        let token = self.cancellation_token.clone();
        let event_bus = Arc::clone(&self.event_bus);
        let component_states = Arc::clone(&self.component_states);
        self.server_task = Some(tokio::spawn(async move {
            if let Err(e) = server.serve(listener, token).await {
                error!("API server error: {}", e);
                component_states
                    .lock()
                    .await
                    .insert(API_SERVER.to_string(), ComponentState::Failed);
                event_bus.notify(EyewatchEvent::SystemError {
                    component: API_SERVER.to_string(),
                    error: e.to_string(),
                });
            }
        }));
        self.set_component_state(API_SERVER, ComponentState::Running)
            .await;

        info!(
            "Eyewatch started on {}:{}",
            self.config.server.ip, self.config.server.port
        );
        Ok(())
    }
}

/// Log every bus event until cancelled
fn spawn_event_log(
    event_bus: Arc<EventBus>,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let mut receiver = event_bus.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = receiver.recv() => match received {
                    Ok(event) => info!(event = event.event_type(), "{}", event.description()),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Event log lagged behind by {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    })
}
