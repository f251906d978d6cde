use super::orchestrator::{API_SERVER, EVENT_LOG, MONITOR};
use super::{ComponentState, EyewatchOrchestrator};
use crate::error::Result;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info};

const STOP_TIMEOUT: Duration = Duration::from_secs(10);

impl EyewatchOrchestrator {
    /// Cancel every background task and wait for each to finish
    pub async fn shutdown(&mut self) -> Result<i32> {
        info!("Beginning graceful shutdown");

        self.cancellation_token.cancel();

        let mut exit_code = 0;

        // Server first so no request observes a stopped monitor
        let server_task = self.server_task.take();
        if !self.stop_task(API_SERVER, server_task).await {
            exit_code = 1;
        }

        self.set_component_state(MONITOR, ComponentState::Stopping)
            .await;
        if timeout(STOP_TIMEOUT, self.monitor.join()).await.is_ok() {
            self.set_component_state(MONITOR, ComponentState::Stopped)
                .await;
            info!("{} component stopped", MONITOR);
        } else {
            error!("{} component stop timeout", MONITOR);
            self.set_component_state(MONITOR, ComponentState::Failed)
                .await;
            exit_code = 1;
        }

        let event_log_task = self.event_log_task.take();
        if !self.stop_task(EVENT_LOG, event_log_task).await {
            exit_code = 1;
        }

        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }

    /// Wait for a cancelled task. Returns false if it failed or hung.
    async fn stop_task(&self, component: &str, task: Option<JoinHandle<()>>) -> bool {
        let Some(task) = task else {
            self.set_component_state(component, ComponentState::Stopped)
                .await;
            return true;
        };

        info!("Stopping {} component", component);
        self.set_component_state(component, ComponentState::Stopping)
            .await;

        match timeout(STOP_TIMEOUT, task).await {
            Ok(Ok(())) => {
                self.set_component_state(component, ComponentState::Stopped)
                    .await;
                info!("{} component stopped", component);
                true
            }
            Ok(Err(e)) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("Error stopping {} component: {}", component, e);
                false
            }
            Err(_) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                error!("{} component stop timeout", component);
                false
            }
        }
    }
}
