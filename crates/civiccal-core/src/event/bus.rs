//! Broadcast bus for distributing `AppointmentChange` to multiple
//! subscribers.
//!
//! Built on `tokio::sync::broadcast`, the `ChangeBus` supports multiple
//! concurrent subscribers. Publishing with no active subscribers is a
//! no-op.

use civiccal_types::event::AppointmentChange;
use tokio::sync::broadcast;

/// Multi-consumer bus for appointment change notifications.
///
/// Wraps a `tokio::sync::broadcast` channel. Cloning the bus clones the
/// sender, allowing multiple producers and consumers.
pub struct ChangeBus {
    sender: broadcast::Sender<AppointmentChange>,
}

impl ChangeBus {
    /// Create a new change bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<AppointmentChange> {
        self.sender.subscribe()
    }

    /// Publish a notification to all current subscribers.
    ///
    /// If there are no subscribers, the notification is silently dropped.
    pub fn publish(&self, change: AppointmentChange) {
        let _ = self.sender.send(change);
    }
}

impl Clone for ChangeBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
