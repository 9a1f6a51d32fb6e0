//! Chat session aggregate type.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_SESSION_MODE, DEFAULT_SESSION_TITLE};

/// Session metadata as exposed over `GET /sessions/{id}`.
///
/// Field names stay snake_case on the wire; the UI reads
/// `working_directory` verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub model: String,
    pub mode: String,
    pub working_directory: Option<String>,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

impl Session {
    /// Title to render: the stored title, or the placeholder when empty.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_SESSION_TITLE
        } else {
            &self.title
        }
    }

    /// Mode to render, falling back to `"code"` for legacy empty rows.
    pub fn effective_mode(&self) -> &str {
        if self.mode.is_empty() {
            DEFAULT_SESSION_MODE
        } else {
            &self.mode
        }
    }
}

/// Partial update of session metadata. `None` leaves a field as is.
///
/// `working_directory: Some(None)` clears the directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct SessionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    #[ts(optional)]
    pub working_directory: Option<Option<String>>,
}

impl SessionUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.model.is_none()
            && self.mode.is_none()
            && self.working_directory.is_none()
    }
}

// Distinguishes an explicit `null` from a missing key.
fn deserialize_some<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
