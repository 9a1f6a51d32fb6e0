use chatdesk_shared::schemas::SyncEvent;
use tokio::sync::broadcast;
use tracing::trace;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Fans sync events out to every live subscriber (SSE streams, the panel).
/// Subscribers only see events emitted after they subscribed.
pub struct EventPublisher {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: SyncEvent) {
        // Err only means nobody is listening right now.
        match self.tx.send(event) {
            Ok(receivers) => trace!(receivers, "sync event emitted"),
            Err(_) => trace!("sync event dropped, no subscribers"),
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
