//! Structured logging
//!
//! One JSON line per event, explicit severity, deterministic key order.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
