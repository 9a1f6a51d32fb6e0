use chatdesk_shared::schemas::{BrowseResponse, FolderEntry};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Handle for one in-flight browse. Only the most recent ticket may apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseTicket {
    generation: u64,
    pub target: Option<String>,
}

/// Folder picker dialog state. A failed browse keeps the last listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderPicker {
    pub current: String,
    pub parent: Option<String>,
    pub directories: Vec<FolderEntry>,
    pub drives: Vec<String>,
    pub path_input: String,
    pub loading: bool,
    pub last_error: Option<String>,
    #[serde(skip)]
    generation: u64,
}

impl FolderPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_browse(&mut self, target: Option<String>) -> BrowseTicket {
        self.generation += 1;
        self.loading = true;
        BrowseTicket {
            generation: self.generation,
            target,
        }
    }

    /// Applies a finished browse. Stale tickets are rejected with
    /// `Cancelled` and change nothing.
    pub fn apply(&mut self, ticket: &BrowseTicket, result: AppResult<BrowseResponse>) -> AppResult<()> {
        if ticket.generation != self.generation {
            return Err(AppError::Cancelled);
        }
        self.loading = false;
        match result {
            Ok(listing) => {
                self.path_input = listing.current.clone();
                self.current = listing.current;
                self.parent = listing.parent;
                self.directories = listing.directories;
                self.drives = listing.drives;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn set_path_input(&mut self, input: impl Into<String>) {
        self.path_input = input.into();
    }

    /// Target for the typed path, if any.
    pub fn submitted_path(&self) -> Option<String> {
        let trimmed = self.path_input.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn go_up(&self) -> Option<String> {
        self.parent.clone()
    }

    pub fn select(&self) -> Option<String> {
        (!self.current.is_empty()).then(|| self.current.clone())
    }
}
