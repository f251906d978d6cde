use crate::error::EventBusError;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Events that can occur in the eyewatch service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EyewatchEvent {
    /// A submitted frame contained a face with both eyes visible
    EyesDetected {
        detection_id: String,
        timestamp: SystemTime,
    },
    /// No eyes were seen for longer than the detection threshold
    TimerStarted { timestamp: SystemTime },
    /// The countdown ran out without an intervening detection
    TimerExpired {
        duration_seconds: u64,
        timestamp: SystemTime,
    },
    /// The countdown was cleared through the reset endpoint
    TimerReset { timestamp: SystemTime },
    /// A system error occurred in a component
    SystemError { component: String, error: String },
    /// System shutdown requested
    ShutdownRequested {
        timestamp: SystemTime,
        reason: String,
    },
}

impl EyewatchEvent {
    /// Get the timestamp of the event
    pub fn timestamp(&self) -> SystemTime {
        match self {
            EyewatchEvent::EyesDetected { timestamp, .. } => *timestamp,
            EyewatchEvent::TimerStarted { timestamp } => *timestamp,
            EyewatchEvent::TimerExpired { timestamp, .. } => *timestamp,
            EyewatchEvent::TimerReset { timestamp } => *timestamp,
            EyewatchEvent::SystemError { .. } => SystemTime::now(),
            EyewatchEvent::ShutdownRequested { timestamp, .. } => *timestamp,
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            EyewatchEvent::EyesDetected { detection_id, .. } => {
                format!("Eyes detected (detection {})", detection_id)
            }
            EyewatchEvent::TimerStarted { .. } => "Timer started".to_string(),
            EyewatchEvent::TimerExpired {
                duration_seconds, ..
            } => {
                format!("Timer expired after {} seconds", duration_seconds)
            }
            EyewatchEvent::TimerReset { .. } => "Timer reset".to_string(),
            EyewatchEvent::SystemError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
            EyewatchEvent::ShutdownRequested { reason, .. } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            EyewatchEvent::EyesDetected { .. } => "eyes_detected",
            EyewatchEvent::TimerStarted { .. } => "timer_started",
            EyewatchEvent::TimerExpired { .. } => "timer_expired",
            EyewatchEvent::TimerReset { .. } => "timer_reset",
            EyewatchEvent::SystemError { .. } => "system_error",
            EyewatchEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }
}

/// Event bus for component coordination using broadcast channels
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EyewatchEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<EyewatchEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers.
    ///
    /// Sending never blocks, so this is callable from the blocking detection
    /// pool as well as from async tasks. Fails only when nobody is subscribed.
    pub fn publish(&self, event: EyewatchEvent) -> Result<usize, EventBusError> {
        debug!("Publishing event: {}", event.description());

        match &event {
            EyewatchEvent::TimerExpired {
                duration_seconds, ..
            } => {
                warn!("Timer expired after {} seconds without eyes", duration_seconds);
            }
            EyewatchEvent::SystemError { component, error } => {
                error!("System error in {}: {}", component, error);
            }
            EyewatchEvent::ShutdownRequested { reason, .. } => {
                info!("Shutdown requested: {}", reason);
            }
            _ => {}
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Publish an event, logging instead of failing when nobody listens
    pub fn notify(&self, event: EyewatchEvent) {
        let event_type = event.event_type();
        if let Err(e) = self.publish(event) {
            debug!("No subscribers for {} event: {}", event_type, e);
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
