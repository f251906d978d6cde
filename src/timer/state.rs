use crate::config::TimerConfig;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::status::TimerStatus;

/// Mutable fields guarded together so every operation sees a consistent pair.
/// The countdown is active exactly when `timer_start` is set.
#[derive(Debug)]
struct TimerFields {
    timer_start: Option<Instant>,
    last_detection: Instant,
}

/// Process-wide eye presence state shared by the API handlers and the monitor
#[derive(Debug)]
pub struct DetectionState {
    fields: Mutex<TimerFields>,
    duration: Duration,
    detection_threshold: Duration,
}

/// Point-in-time copy of the timer fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub timer_active: bool,
    pub timer_start: Option<Instant>,
    pub last_detection: Instant,
}

impl DetectionState {
    pub fn new(duration: Duration, detection_threshold: Duration) -> Self {
        Self::new_at(duration, detection_threshold, Instant::now())
    }

    pub fn new_at(duration: Duration, detection_threshold: Duration, now: Instant) -> Self {
        Self {
            fields: Mutex::new(TimerFields {
                timer_start: None,
                last_detection: now,
            }),
            duration,
            detection_threshold,
        }
    }

    pub fn from_config(config: &TimerConfig) -> Self {
        Self::new(config.duration(), config.detection_threshold())
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn detection_threshold(&self) -> Duration {
        self.detection_threshold
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let fields = self.fields.lock();
        TimerSnapshot {
            timer_active: fields.timer_start.is_some(),
            timer_start: fields.timer_start,
            last_detection: fields.last_detection,
        }
    }

    pub fn is_active(&self) -> bool {
        self.fields.lock().timer_start.is_some()
    }

    /// Record a frame in which eyes were found. Returns true if this cleared
    /// a running countdown.
    pub fn record_detection(&self) -> bool {
        self.record_detection_at(Instant::now())
    }

    pub fn record_detection_at(&self, now: Instant) -> bool {
        let mut fields = self.fields.lock();
        if now > fields.last_detection {
            fields.last_detection = now;
        }

        let cleared = fields.timer_start.take().is_some();
        if cleared {
            info!("Eyes detected, countdown cleared");
        }
        cleared
    }

    /// One monitor tick: start the countdown once no eyes have been seen for
    /// longer than the detection threshold. Returns true if it started now.
    pub fn check_threshold(&self) -> bool {
        self.check_threshold_at(Instant::now())
    }

    pub fn check_threshold_at(&self, now: Instant) -> bool {
        let mut fields = self.fields.lock();
        if fields.timer_start.is_some() {
            return false;
        }

        let since_detection = now.saturating_duration_since(fields.last_detection);
        if since_detection > self.detection_threshold {
            fields.timer_start = Some(now);
            debug!(
                "No eyes for {:.1}s, starting countdown",
                since_detection.as_secs_f64()
            );
            true
        } else {
            false
        }
    }

    /// Clear the countdown and treat now as the last detection
    pub fn reset(&self) {
        self.reset_at(Instant::now())
    }

    pub fn reset_at(&self, now: Instant) {
        let mut fields = self.fields.lock();
        fields.timer_start = None;
        if now > fields.last_detection {
            fields.last_detection = now;
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.status_at(Instant::now())
    }

    /// Read-only view of the countdown. An expired countdown stays active
    /// until a detection or reset clears it.
    pub fn status_at(&self, now: Instant) -> TimerStatus {
        let timer_start = self.fields.lock().timer_start;

        match timer_start {
            None => TimerStatus::inactive(),
            Some(start) => {
                let elapsed = now.saturating_duration_since(start);
                let remaining = self.duration.saturating_sub(elapsed);
                if remaining.is_zero() {
                    TimerStatus::expired(self.duration)
                } else {
                    TimerStatus::counting(remaining.as_secs())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn state_at(start: Instant) -> DetectionState {
        DetectionState::new_at(secs(300), secs(2), start)
    }

    #[test]
    fn test_initial_state_inactive() {
        let t0 = Instant::now();
        let state = state_at(t0);

        let snapshot = state.snapshot();
        assert!(!snapshot.timer_active);
        assert_eq!(snapshot.timer_start, None);
        assert_eq!(snapshot.last_detection, t0);

        let status = state.status_at(t0);
        assert!(!status.timer_active);
        assert_eq!(status.remaining_time, 0);
        assert_eq!(status.message, "Eyes detected - Timer inactive");
        assert_eq!(status.alert, None);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let t0 = Instant::now();
        let state = state_at(t0);

        assert!(!state.check_threshold_at(t0 + secs(1)));
        assert!(!state.check_threshold_at(t0 + secs(2)));
        assert!(!state.is_active());

        assert!(state.check_threshold_at(t0 + secs(3)));
        assert!(state.is_active());
        assert_eq!(state.snapshot().timer_start, Some(t0 + secs(3)));
    }

    #[test]
    fn test_threshold_does_not_restart_running_timer() {
        let t0 = Instant::now();
        let state = state_at(t0);

        assert!(state.check_threshold_at(t0 + secs(3)));
        assert!(!state.check_threshold_at(t0 + secs(10)));
        assert_eq!(state.snapshot().timer_start, Some(t0 + secs(3)));
    }

    #[test]
    fn test_countdown_status() {
        let t0 = Instant::now();
        let state = state_at(t0);
        state.check_threshold_at(t0 + secs(3));

        let status = state.status_at(t0 + secs(3) + Duration::from_millis(10_500));
        assert!(status.timer_active);
        assert_eq!(status.remaining_time, 289);
        assert_eq!(status.message, "Eyes closed - Timer active (289s remaining)");
        assert_eq!(status.alert, None);
    }

    #[test]
    fn test_expired_status_is_sticky() {
        let t0 = Instant::now();
        let state = state_at(t0);
        state.check_threshold_at(t0 + secs(3));

        for later in [303, 304, 1000] {
            let status = state.status_at(t0 + secs(later));
            assert!(status.timer_active);
            assert_eq!(status.remaining_time, 0);
            assert_eq!(status.alert, Some(true));
            assert_eq!(status.message, "Timer expired! Eyes closed for 5 minutes");
        }

        // Expiry is reported, never cleared by reading or ticking
        assert!(!state.check_threshold_at(t0 + secs(2000)));
        assert!(state.is_active());
    }

    #[test]
    fn test_remaining_time_non_increasing() {
        let t0 = Instant::now();
        let state = state_at(t0);
        state.check_threshold_at(t0 + secs(3));

        let mut previous = u64::MAX;
        for offset in (0..400).step_by(7) {
            let remaining = state.status_at(t0 + secs(3 + offset)).remaining_time;
            assert!(remaining <= previous);
            previous = remaining;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_detection_clears_active_timer() {
        let t0 = Instant::now();
        let state = state_at(t0);
        state.check_threshold_at(t0 + secs(3));

        assert!(state.record_detection_at(t0 + secs(20)));
        let snapshot = state.snapshot();
        assert!(!snapshot.timer_active);
        assert_eq!(snapshot.timer_start, None);
        assert_eq!(snapshot.last_detection, t0 + secs(20));

        // Within the grace period the countdown stays off
        assert!(!state.check_threshold_at(t0 + secs(22)));
        assert!(!state.status_at(t0 + secs(22)).timer_active);

        assert!(!state.record_detection_at(t0 + secs(21)));
    }

    #[test]
    fn test_last_detection_never_moves_backwards() {
        let t0 = Instant::now();
        let state = state_at(t0);

        state.record_detection_at(t0 + secs(10));
        state.record_detection_at(t0 + secs(5));
        assert_eq!(state.snapshot().last_detection, t0 + secs(10));

        state.reset_at(t0 + secs(7));
        assert_eq!(state.snapshot().last_detection, t0 + secs(10));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let t0 = Instant::now();
        let state = state_at(t0);
        state.check_threshold_at(t0 + secs(3));

        state.reset_at(t0 + secs(50));
        state.reset_at(t0 + secs(50));

        let status = state.status_at(t0 + secs(50));
        assert!(!status.timer_active);
        assert_eq!(status.remaining_time, 0);
        assert_eq!(state.snapshot().last_detection, t0 + secs(50));
        assert!(!state.check_threshold_at(t0 + secs(52)));
        assert!(state.check_threshold_at(t0 + secs(53)));
    }
}
