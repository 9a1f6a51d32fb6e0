use chatdesk_shared::schemas::{Message, MessagesResponse, Session};
use serde::Serialize;

use crate::error::AppError;

/// What the error view offers the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryAction {
    StartNewChat,
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewError {
    pub message: String,
    pub action: RecoveryAction,
}

impl ViewError {
    pub fn from_app_error(err: &AppError) -> Self {
        let action = if err.is_not_found() {
            RecoveryAction::StartNewChat
        } else {
            RecoveryAction::Reload
        };
        Self {
            message: err.user_message(),
            action,
        }
    }
}

/// Chat pane for the active session: its header fields and the loaded
/// window of messages, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Option<String>,
    pub title: String,
    pub model: String,
    pub mode: String,
    pub messages: Vec<Message>,
    pub has_more: bool,
    pub loading: bool,
    pub loading_earlier: bool,
    pub error: Option<ViewError>,
}

impl SessionView {
    /// Blank view shown while `session_id` loads.
    pub fn loading(session_id: &str) -> Self {
        Self {
            session_id: Some(session_id.to_string()),
            loading: true,
            ..Default::default()
        }
    }

    /// Header fields; messages are still loading.
    pub fn set_header(&mut self, session: &Session) {
        self.title = session.display_title().to_string();
        self.model = session.model.clone();
        self.mode = session.effective_mode().to_string();
    }

    pub fn show_page(&mut self, page: MessagesResponse) {
        self.messages = page.messages;
        self.has_more = page.has_more;
        self.loading = false;
        self.error = None;
    }

    pub fn fail(&mut self, err: &AppError) {
        self.loading = false;
        self.loading_earlier = false;
        self.error = Some(ViewError::from_app_error(err));
    }

    /// Cursor for the next older page, if there is one to load.
    pub fn earlier_cursor(&self) -> Option<i64> {
        if !self.has_more || self.loading || self.loading_earlier {
            return None;
        }
        self.messages.first().map(|m| m.row_id)
    }

    pub fn prepend(&mut self, page: MessagesResponse) {
        let mut messages = page.messages;
        messages.append(&mut self.messages);
        self.messages = messages;
        self.has_more = page.has_more;
        self.loading_earlier = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(row_id: i64) -> Message {
        Message {
            id: format!("m{row_id}"),
            session_id: "s1".into(),
            role: "user".into(),
            content: String::new(),
            created_at: row_id,
            row_id,
        }
    }

    fn page(rows: std::ops::RangeInclusive<i64>, has_more: bool) -> MessagesResponse {
        let messages: Vec<Message> = rows.map(msg).collect();
        MessagesResponse {
            next_before_row_id: messages.first().map(|m| m.row_id),
            messages,
            has_more,
        }
    }

    fn session() -> Session {
        Session {
            id: "s1".into(),
            title: String::new(),
            model: "sonnet".into(),
            mode: String::new(),
            working_directory: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn show_fills_header_and_stops_loading() {
        let mut view = SessionView::loading("s1");
        assert!(view.loading);

        view.set_header(&session());
        assert!(view.loading);
        view.show_page(page(3..=5, true));
        assert!(!view.loading);
        assert_eq!(view.title, "New Conversation");
        assert_eq!(view.mode, "code");
        assert_eq!(view.earlier_cursor(), Some(3));
    }

    #[test]
    fn prepend_keeps_chronological_order() {
        let mut view = SessionView::loading("s1");
        view.set_header(&session());
        view.show_page(page(21..=30, true));
        view.prepend(page(11..=20, false));

        let rows: Vec<i64> = view.messages.iter().map(|m| m.row_id).collect();
        assert_eq!(rows, (11..=30).collect::<Vec<_>>());
        assert_eq!(view.earlier_cursor(), None);
    }

    #[test]
    fn not_found_offers_new_chat() {
        let mut view = SessionView::loading("gone");
        view.fail(&AppError::session_not_found("gone"));
        let err = view.error.clone().unwrap();
        assert_eq!(err.message, "Session not found");
        assert_eq!(err.action, RecoveryAction::StartNewChat);
        assert!(!view.loading);

        view.fail(&AppError::Internal(anyhow::anyhow!("disk on fire")));
        let err = view.error.unwrap();
        assert_eq!(err.action, RecoveryAction::Reload);
        assert!(!err.message.contains("disk"));
    }
}
