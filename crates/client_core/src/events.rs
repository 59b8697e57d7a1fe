//! Non-fatal notifications published by the synchronizers.

use tokio::sync::broadcast;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    FetchFailure,
    MutationFailure,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Notification(Notification),
    Committed { kind: &'static str, entity_id: String },
    PageChanged { kind: &'static str, page: u32, total_pages: u32 },
}

#[derive(Clone)]
pub struct Notifier {
    events: broadcast::Sender<SyncEvent>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self { events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn publish(&self, event: SyncEvent) {
        // No subscribers is fine; presentation may not be listening yet.
        let _ = self.events.send(event);
    }

    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        let message = message.into();
        warn!("notify: kind={kind:?} message={message}");
        self.publish(SyncEvent::Notification(Notification { kind, message }));
    }
}
