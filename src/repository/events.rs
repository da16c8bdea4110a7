//! Domain change notifications
//!
//! Published by the `after_save`/`after_delete` hooks. Delivery is
//! best-effort broadcast; publishing with no subscribers is not an error.

use tokio::sync::broadcast;

/// Observable domain changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// An entity type was inserted or updated
    EntityTypeChanged { name: String },
    /// An entity was inserted or updated
    EntityWritten { entity_type: String, id: String },
    /// An entity was deleted
    EntityDeleted { entity_type: String, id: String },
}

/// Broadcast bus for change events.
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    /// Publishes an event. Silently dropped when nobody listens.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
