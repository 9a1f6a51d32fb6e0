//! Chat message and pagination payloads.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A stored chat message. `row_id` is only a pagination cursor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub role: String,
    pub content: String,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub row_id: i64,
}

/// Body of `GET /sessions/{id}/messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MessagesResponse {
    /// Oldest to newest.
    pub messages: Vec<Message>,
    pub has_more: bool,
    /// Cursor for the next older page; `null` when the page is empty.
    #[ts(type = "number | null")]
    pub next_before_row_id: Option<i64>,
}
