//! Process lifecycle: logging initialization and signal-driven shutdown.

pub mod logging;
pub mod signal;
