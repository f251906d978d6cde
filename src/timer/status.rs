use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Countdown view returned by the status and detect endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStatus {
    pub timer_active: bool,
    /// Whole seconds left, rounded down
    pub remaining_time: u64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<bool>,
}

impl TimerStatus {
    pub fn inactive() -> Self {
        Self {
            timer_active: false,
            remaining_time: 0,
            message: "Eyes detected - Timer inactive".to_string(),
            alert: None,
        }
    }

    pub fn counting(remaining_seconds: u64) -> Self {
        Self {
            timer_active: true,
            remaining_time: remaining_seconds,
            message: format!(
                "Eyes closed - Timer active ({}s remaining)",
                remaining_seconds
            ),
            alert: None,
        }
    }

    pub fn expired(duration: Duration) -> Self {
        Self {
            timer_active: true,
            remaining_time: 0,
            message: format!(
                "Timer expired! Eyes closed for {}",
                describe_duration(duration)
            ),
            alert: Some(true),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.alert == Some(true)
    }
}

/// "5 minutes", "1 minute", "90 seconds"
pub(crate) fn describe_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{} minutes", minutes)
        }
    } else if secs == 1 {
        "1 second".to_string()
    } else {
        format!("{} seconds", secs)
    }
}
