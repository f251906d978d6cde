mod monitor;
mod state;
mod status;

pub use monitor::{TickOutcome, TimerMonitor};
pub use state::{DetectionState, TimerSnapshot};
pub use status::TimerStatus;
