//! Observable events
//!
//! Events are explicit and typed; free-form event strings do not exist.

use std::fmt;

/// Everything the process reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & lifecycle
    /// Startup begins
    BootStart,
    /// Built-in entity types seeded
    StoreSeeded,
    /// Startup complete, ready to serve
    BootComplete,
    /// HTTP server bound and listening
    ServerListening,
    /// Shutdown complete
    ShutdownComplete,

    // Data plane
    /// A persisted schema could not be refreshed after a type change
    SchemaRefreshFailed,
    /// A request failed with a server-side fault
    RequestFailed,
}

impl Event {
    /// Returns the event name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Event::BootStart => "boot_start",
            Event::StoreSeeded => "store_seeded",
            Event::BootComplete => "boot_complete",
            Event::ServerListening => "server_listening",
            Event::ShutdownComplete => "shutdown_complete",
            Event::SchemaRefreshFailed => "schema_refresh_failed",
            Event::RequestFailed => "request_failed",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::BootStart.name(), "boot_start");
        assert_eq!(Event::SchemaRefreshFailed.name(), "schema_refresh_failed");
        assert_eq!(format!("{}", Event::ServerListening), "server_listening");
    }
}
