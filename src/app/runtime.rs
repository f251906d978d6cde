use super::{EyewatchOrchestrator, ShutdownReason};
use crate::error::{EyewatchError, Result};
use crate::events::EyewatchEvent;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::signal;
use tokio::sync::{oneshot, Mutex};
use tracing::{error, info};

impl EyewatchOrchestrator {
    /// Run until a shutdown signal arrives, then shut down gracefully
    pub async fn run(&mut self) -> Result<i32> {
        info!("Eyewatch is running");

        let shutdown_sender = self
            .shutdown_sender
            .take()
            .ok_or_else(|| EyewatchError::system("Shutdown sender already taken"))?;

        let shutdown_receiver = self
            .shutdown_receiver
            .take()
            .ok_or_else(|| EyewatchError::system("Shutdown receiver already taken"))?;

        self.setup_signal_handlers(shutdown_sender);

        let shutdown_reason = shutdown_receiver
            .await
            .map_err(|_| EyewatchError::system("Shutdown channel closed unexpectedly"))?;

        info!("Shutdown initiated: {}", shutdown_reason);
        self.event_bus.notify(EyewatchEvent::ShutdownRequested {
            timestamp: SystemTime::now(),
            reason: shutdown_reason.to_string(),
        });

        let exit_code = self.shutdown().await?;

        info!("Eyewatch shutdown complete");
        Ok(exit_code)
    }

    /// Set up signal handlers for graceful shutdown
    fn setup_signal_handlers(&self, shutdown_sender: oneshot::Sender<ShutdownReason>) {
        let shutdown_sender = Arc::new(Mutex::new(Some(shutdown_sender)));

        // SIGTERM (systemd stop) - Unix only
        #[cfg(unix)]
        {
            let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
            tokio::spawn(async move {
                let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate())
                {
                    Ok(sigterm) => sigterm,
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        return;
                    }
                };

                if sigterm.recv().await.is_some() {
                    info!("Received SIGTERM signal");
                    if let Some(sender) = shutdown_sender_sigterm.lock().await.take() {
                        let _ = sender.send(ShutdownReason::Signal("SIGTERM".to_string()));
                    }
                }
            });
        }

        // SIGINT (Ctrl+C) - Cross-platform
        let shutdown_sender_sigint = Arc::clone(&shutdown_sender);
        tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                info!("Received SIGINT signal (Ctrl+C)");
                if let Some(sender) = shutdown_sender_sigint.lock().await.take() {
                    let _ = sender.send(ShutdownReason::Signal("SIGINT".to_string()));
                }
            }
        });
    }
}
