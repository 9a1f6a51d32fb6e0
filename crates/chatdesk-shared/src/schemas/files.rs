//! Directory browsing payloads used by the folder picker and file tree.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
}

/// Body of `GET /files/browse`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct BrowseResponse {
    pub current: String,
    pub parent: Option<String>,
    pub directories: Vec<FolderEntry>,
    /// Only present on platforms with several filesystem roots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[ts(type = "string[] | undefined")]
    pub drives: Vec<String>,
}
