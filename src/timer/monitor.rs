use crate::events::{EventBus, EyewatchEvent};
use crate::timer::DetectionState;

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What a single monitor tick observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub timer_started: bool,
    pub timer_expired: bool,
}

/// Background loop that starts the countdown once eyes have been missing for
/// longer than the detection threshold
pub struct TimerMonitor {
    state: Arc<DetectionState>,
    event_bus: Arc<EventBus>,
    poll_interval: Duration,
    monitor_task: Option<JoinHandle<()>>,
}

impl TimerMonitor {
    pub fn new(
        state: Arc<DetectionState>,
        event_bus: Arc<EventBus>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            state,
            event_bus,
            poll_interval,
            monitor_task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.monitor_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Spawn the polling task. It ticks immediately, then once per poll
    /// interval, until `shutdown` is cancelled.
    pub fn start(&mut self, shutdown: CancellationToken) {
        if self.is_running() {
            warn!("Timer monitor is already running");
            return;
        }

        info!(
            "Starting timer monitor (poll every {:?}, threshold {:?}, duration {:?})",
            self.poll_interval,
            self.state.detection_threshold(),
            self.state.duration()
        );

        let state = Arc::clone(&self.state);
        let event_bus = Arc::clone(&self.event_bus);
        let poll_interval = self.poll_interval;

        let task = tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut expiry_reported = false;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("Timer monitor stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        run_tick(&state, &event_bus, Instant::now(), &mut expiry_reported);
                    }
                }
            }
        });

        self.monitor_task = Some(task);
    }

    /// Wait for the task to finish after its token was cancelled
    pub async fn join(&mut self) {
        if let Some(task) = self.monitor_task.take() {
            if let Err(e) = task.await {
                warn!("Timer monitor task ended abnormally: {}", e);
            }
        }
    }
}

/// Apply one tick to the shared state. `expiry_reported` carries across ticks
/// so each countdown publishes at most one expiry event.
pub(crate) fn run_tick(
    state: &DetectionState,
    event_bus: &EventBus,
    now: Instant,
    expiry_reported: &mut bool,
) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    if state.check_threshold_at(now) {
        outcome.timer_started = true;
        info!("Timer started at {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"));
        event_bus.notify(EyewatchEvent::TimerStarted {
            timestamp: SystemTime::now(),
        });
    }

    let status = state.status_at(now);
    if !status.timer_active {
        *expiry_reported = false;
    } else if status.is_expired() && !*expiry_reported {
        *expiry_reported = true;
        outcome.timer_expired = true;
        event_bus.notify(EyewatchEvent::TimerExpired {
            duration_seconds: state.duration().as_secs(),
            timestamp: SystemTime::now(),
        });
    } else {
        debug!("Timer status: {}", status.message);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_tick_starts_timer_after_threshold() {
        let t0 = Instant::now();
        let state = DetectionState::new_at(secs(300), secs(2), t0);
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();
        let mut reported = false;

        let outcome = run_tick(&state, &event_bus, t0 + secs(1), &mut reported);
        assert_eq!(outcome, TickOutcome::default());

        let outcome = run_tick(&state, &event_bus, t0 + secs(3), &mut reported);
        assert!(outcome.timer_started);
        assert!(!outcome.timer_expired);
        assert!(state.is_active());

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.event_type(), "timer_started");
    }

    #[test]
    fn test_expiry_reported_once_per_countdown() {
        let t0 = Instant::now();
        let state = DetectionState::new_at(secs(300), secs(2), t0);
        let event_bus = EventBus::new(10);
        let mut reported = false;

        run_tick(&state, &event_bus, t0 + secs(3), &mut reported);

        let outcome = run_tick(&state, &event_bus, t0 + secs(303), &mut reported);
        assert!(outcome.timer_expired);
        let outcome = run_tick(&state, &event_bus, t0 + secs(304), &mut reported);
        assert!(!outcome.timer_expired);
        assert!(state.is_active());

        // A detection clears the countdown and re-arms the expiry report
        state.record_detection_at(t0 + secs(305));
        run_tick(&state, &event_bus, t0 + secs(306), &mut reported);
        assert!(!reported);

        let outcome = run_tick(&state, &event_bus, t0 + secs(308), &mut reported);
        assert!(outcome.timer_started);
        let outcome = run_tick(&state, &event_bus, t0 + secs(608), &mut reported);
        assert!(outcome.timer_expired);
    }

    #[tokio::test]
    async fn test_monitor_task_activates_timer() {
        let state = Arc::new(DetectionState::new(
            Duration::from_secs(300),
            Duration::from_millis(30),
        ));
        let event_bus = Arc::new(EventBus::new(10));
        let mut monitor =
            TimerMonitor::new(Arc::clone(&state), event_bus, Duration::from_millis(10));
        let token = CancellationToken::new();

        monitor.start(token.clone());
        assert!(monitor.is_running());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(state.status().timer_active);

        token.cancel();
        monitor.join().await;
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_monitor_leaves_fresh_detection_alone() {
        let state = Arc::new(DetectionState::new(
            Duration::from_secs(300),
            Duration::from_secs(2),
        ));
        let event_bus = Arc::new(EventBus::new(10));
        let mut monitor =
            TimerMonitor::new(Arc::clone(&state), event_bus, Duration::from_millis(10));
        let token = CancellationToken::new();

        monitor.start(token.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!state.is_active());

        token.cancel();
        monitor.join().await;
    }
}
