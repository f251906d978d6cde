mod orchestrator;
mod runtime;
mod shutdown;
mod startup;
mod state;
mod types;


pub use orchestrator::EyewatchOrchestrator;
pub use types::{ComponentState, ShutdownReason};
