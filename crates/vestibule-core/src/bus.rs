//! Cross-instance change notification bus.
//!
//! Mirrors the browser storage event: every store instance over the same
//! profile storage publishes its writes here, and every other instance
//! applies them to its in-memory state. Events are tagged with the writing
//! instance's id so an instance never applies its own writes. Delivery is
//! best-effort, at-least-once from a live receiver's perspective, with no
//! ordering guarantee across instances; a lagged receiver drops missed
//! events and continues from the current position.

use tokio::sync::broadcast;
use uuid::Uuid;

/// Broadcast channel depth. Maintenance toggles are rare, so a small buffer
/// is plenty; overflow only costs a receiver the dropped events.
const BUS_CAPACITY: usize = 64;

/// A single profile storage key change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChange {
    /// Id of the store instance that performed the write.
    pub origin: Uuid,
    /// The profile storage key that changed.
    pub key: String,
    /// The new value, or `None` when the key was deleted.
    pub value: Option<String>,
}

/// Broadcast bus joining store instances over the same profile storage.
///
/// Cloning shares the underlying channel, so every instance holding a clone
/// sees every publish.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<KeyChange>,
}

impl ChangeBus {
    /// Create a new bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publish a key change to all current subscribers.
    ///
    /// Returns silently when nobody is subscribed; the bus is advisory.
    pub fn publish(&self, origin: Uuid, key: &str, value: Option<&str>) {
        let _ = self.tx.send(KeyChange {
            origin,
            key: key.to_owned(),
            value: value.map(str::to_owned),
        });
    }

    /// Subscribe to changes published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<KeyChange> {
        self.tx.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
