//! Real-time events pushed to UI listeners over SSE.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::message::Message;
use super::session::Session;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(tag = "type")]
#[ts(export)]
pub enum SyncEvent {
    #[serde(rename = "session-added")]
    SessionAdded {
        #[serde(rename = "sessionId")]
        session_id: String,
        session: Session,
    },
    #[serde(rename = "session-updated")]
    SessionUpdated {
        #[serde(rename = "sessionId")]
        session_id: String,
        session: Session,
    },
    #[serde(rename = "message-received")]
    MessageReceived {
        #[serde(rename = "sessionId")]
        session_id: String,
        message: Message,
    },
    /// One-shot request for the chat composer to attach a file reference.
    #[serde(rename = "file-attach")]
    FileAttach { path: String },
}

impl SyncEvent {
    pub fn session_id(&self) -> Option<&str> {
        match self {
            SyncEvent::SessionAdded { session_id, .. }
            | SyncEvent::SessionUpdated { session_id, .. }
            | SyncEvent::MessageReceived { session_id, .. } => Some(session_id),
            SyncEvent::FileAttach { .. } => None,
        }
    }
}
