use chatdesk_shared::preview::is_previewable;
use chatdesk_shared::schemas::Session;
use serde::Serialize;

/// Side panel state shared by the whole process.
///
/// Starts closed and empty. Mutated only through the navigator, which
/// serializes writers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelState {
    pub working_directory: Option<String>,
    pub active_session_id: Option<String>,
    pub session_title: String,
    pub panel_open: bool,
    pub preview_file: Option<String>,
}

impl PanelState {
    /// Makes `session` the active one. The working directory is sticky: a
    /// session without one keeps the previous directory.
    pub fn apply_session(&mut self, session: &Session) {
        if self.active_session_id.as_deref() != Some(session.id.as_str()) {
            self.preview_file = None;
        }
        self.active_session_id = Some(session.id.clone());
        self.session_title = session.display_title().to_string();
        self.panel_open = true;
        if let Some(dir) = session.working_directory.as_deref().filter(|d| !d.is_empty()) {
            self.working_directory = Some(dir.to_string());
        }
    }

    /// Selecting the previewed file again closes the preview. Binary formats
    /// are ignored. Returns whether anything changed.
    pub fn toggle_preview(&mut self, path: &str) -> bool {
        if self.preview_file.as_deref() == Some(path) {
            self.preview_file = None;
            return true;
        }
        if !is_previewable(path) {
            return false;
        }
        self.preview_file = Some(path.to_string());
        true
    }

    pub fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
    }
}
