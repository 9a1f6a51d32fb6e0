use tokio::sync::broadcast;
use tracing::debug;

/// Request for the chat composer to reference a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttach {
    pub path: String,
}

/// Process-wide one-shot notification channel. Publishing never blocks,
/// nothing is queued for subscribers that arrive later.
#[derive(Debug, Clone)]
pub struct AttachChannel {
    tx: broadcast::Sender<FileAttach>,
}

impl AttachChannel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileAttach> {
        self.tx.subscribe()
    }

    /// Returns whether at least one listener received the event.
    pub fn publish(&self, path: &str) -> bool {
        let delivered = self
            .tx
            .send(FileAttach {
                path: path.to_string(),
            })
            .is_ok();
        debug!(path, delivered, "file attach requested");
        delivered
    }
}

impl Default for AttachChannel {
    fn default() -> Self {
        Self::new()
    }
}
