use chatdesk_shared::schemas::{Message, Session};

#[derive(Debug, Clone)]
pub struct StoredSession {
    pub id: String,
    pub title: String,
    pub model: String,
    pub mode: String,
    pub working_directory: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<StoredSession> for Session {
    fn from(s: StoredSession) -> Self {
        Session {
            id: s.id,
            title: s.title,
            model: s.model,
            mode: s.mode,
            working_directory: s.working_directory,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub row_id: i64,
    pub id: String,
    pub session_id: String,
    pub role: String,
    pub content: String,
    pub created_at: i64,
}

impl From<StoredMessage> for Message {
    fn from(m: StoredMessage) -> Self {
        Message {
            id: m.id,
            session_id: m.session_id,
            role: m.role,
            content: m.content,
            created_at: m.created_at,
            row_id: m.row_id,
        }
    }
}

/// Fields used when a session is created on first use.
#[derive(Debug, Clone, Default)]
pub struct NewSession<'a> {
    pub title: Option<&'a str>,
    pub model: Option<&'a str>,
    pub mode: Option<&'a str>,
    pub working_directory: Option<&'a str>,
}

/// One window of a session's messages, oldest first.
#[derive(Debug, Clone)]
pub struct MessageWindow {
    pub messages: Vec<StoredMessage>,
    pub has_more: bool,
}
