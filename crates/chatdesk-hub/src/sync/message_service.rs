use chatdesk_shared::schemas::{Message, MessagesResponse, SyncEvent};

use super::event_publisher::EventPublisher;
use crate::error::{AppError, AppResult};
use crate::store::Store;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 500;

/// Page size after normalization: always within `1..=500`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit(i64);

impl PageLimit {
    /// Absent → 100, out of range → clamped.
    pub fn new(limit: Option<i64>) -> Self {
        Self(limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT))
    }

    /// Parses a raw query value. Anything that is not an integer counts as
    /// absent; bad limits are never an error.
    pub fn parse(raw: Option<&str>) -> Self {
        Self::new(raw.and_then(|s| s.trim().parse::<i64>().ok()))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        Self(DEFAULT_PAGE_LIMIT)
    }
}

/// Parses a raw `before` cursor. Non-integers and `0` are treated as absent.
/// A negative cursor is kept and bounds an empty page.
pub fn parse_cursor(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&row_id| row_id != 0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub session_id: String,
    pub limit: PageLimit,
    pub before_row_id: Option<i64>,
}

impl PageRequest {
    pub fn newest(session_id: impl Into<String>, limit: PageLimit) -> Self {
        Self {
            session_id: session_id.into(),
            limit,
            before_row_id: None,
        }
    }

    pub fn before(session_id: impl Into<String>, limit: PageLimit, row_id: i64) -> Self {
        Self {
            session_id: session_id.into(),
            limit,
            before_row_id: Some(row_id).filter(|&r| r != 0),
        }
    }
}

pub struct MessageService;

impl MessageService {
    /// Reads one page of a session's messages, oldest first.
    ///
    /// Fails with `NotFound` when the session does not exist; an existing
    /// session without messages yields an empty page.
    pub fn fetch_page(store: &Store, req: &PageRequest) -> AppResult<MessagesResponse> {
        use crate::store::{messages, sessions};

        let conn = store.conn();
        if !sessions::session_exists(&conn, &req.session_id)? {
            return Err(AppError::session_not_found(&req.session_id));
        }

        let window =
            messages::get_messages_page(&conn, &req.session_id, req.limit.get(), req.before_row_id)?;
        drop(conn);

        let next_before_row_id = window.messages.first().map(|m| m.row_id);
        let messages: Vec<Message> = window.messages.into_iter().map(Message::from).collect();

        Ok(MessagesResponse {
            messages,
            has_more: window.has_more,
            next_before_row_id,
        })
    }

    /// Stores a message and announces it. Used for seeding and imports;
    /// there is no authoring route.
    pub fn append_message(
        store: &Store,
        publisher: &EventPublisher,
        session_id: &str,
        role: &str,
        content: &str,
    ) -> AppResult<Message> {
        use crate::store::{messages, sessions};

        let stored = {
            let conn = store.conn();
            if !sessions::session_exists(&conn, session_id)? {
                return Err(AppError::session_not_found(session_id));
            }
            messages::add_message(&conn, session_id, role, content)?
        };

        let message = Message::from(stored);
        publisher.emit(SyncEvent::MessageReceived {
            session_id: session_id.to_string(),
            message: message.clone(),
        });
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sessions;
    use crate::store::types::NewSession;

    fn store_with(session_id: &str, count: usize) -> (Store, EventPublisher) {
        let store = Store::new_in_memory().unwrap();
        let publisher = EventPublisher::new();
        sessions::get_or_create_session(&store.conn(), session_id, &NewSession::default())
            .unwrap();
        for i in 0..count {
            MessageService::append_message(
                &store,
                &publisher,
                session_id,
                if i % 2 == 0 { "user" } else { "assistant" },
                &format!("m{}", i + 1),
            )
            .unwrap();
        }
        (store, publisher)
    }

    fn row_ids(resp: &MessagesResponse) -> Vec<i64> {
        resp.messages.iter().map(|m| m.row_id).collect()
    }

    #[test]
    fn limit_normalization() {
        assert_eq!(PageLimit::new(None).get(), 100);
        assert_eq!(PageLimit::new(Some(0)).get(), 1);
        assert_eq!(PageLimit::new(Some(-7)).get(), 1);
        assert_eq!(PageLimit::new(Some(501)).get(), 500);
        assert_eq!(PageLimit::new(Some(i64::MAX)).get(), 500);
        assert_eq!(PageLimit::new(Some(42)).get(), 42);
        assert_eq!(PageLimit::parse(Some("abc")).get(), 100);
        assert_eq!(PageLimit::parse(Some("")).get(), 100);
        assert_eq!(PageLimit::parse(Some("2.5")).get(), 100);
        assert_eq!(PageLimit::parse(Some(" 20 ")).get(), 20);
        assert_eq!(PageLimit::parse(Some("9999")).get(), 500);
        assert_eq!(PageLimit::parse(None), PageLimit::default());
    }

    #[test]
    fn cursor_parsing() {
        assert_eq!(parse_cursor(Some("21")), Some(21));
        assert_eq!(parse_cursor(Some("0")), None);
        assert_eq!(parse_cursor(Some("-3")), Some(-3));
        assert_eq!(parse_cursor(Some("x")), None);
        assert_eq!(parse_cursor(None), None);
        assert_eq!(PageRequest::before("s", PageLimit::default(), 0).before_row_id, None);
    }

    #[test]
    fn scenario_120_messages() {
        let (store, _) = store_with("s1", 120);

        let first =
            MessageService::fetch_page(&store, &PageRequest::newest("s1", PageLimit::new(Some(100))))
                .unwrap();
        assert_eq!(row_ids(&first), (21..=120).collect::<Vec<_>>());
        assert!(first.has_more);
        assert_eq!(first.next_before_row_id, Some(21));

        let second = MessageService::fetch_page(
            &store,
            &PageRequest::before("s1", PageLimit::new(Some(100)), 21),
        )
        .unwrap();
        assert_eq!(row_ids(&second), (1..=20).collect::<Vec<_>>());
        assert!(!second.has_more);
    }

    #[test]
    fn missing_session_is_not_found() {
        let (store, _) = store_with("s1", 1);
        let err = MessageService::fetch_page(
            &store,
            &PageRequest::newest("missing-session", PageLimit::new(Some(50))),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_session_is_not_an_error() {
        let (store, _) = store_with("fresh", 0);
        let page =
            MessageService::fetch_page(&store, &PageRequest::newest("fresh", PageLimit::default()))
                .unwrap();
        assert!(page.messages.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_before_row_id, None);
    }

    #[test]
    fn walking_pages_visits_every_message_once() {
        for (total, limit) in [(0usize, 7i64), (1, 1), (20, 5), (23, 5), (37, 500), (50, 1)] {
            let (store, _) = store_with("walk", total);
            let limit = PageLimit::new(Some(limit));

            let mut pages: Vec<Vec<i64>> = Vec::new();
            let mut req = PageRequest::newest("walk", limit);
            loop {
                let page = MessageService::fetch_page(&store, &req).unwrap();
                pages.push(row_ids(&page));
                match (page.has_more, page.next_before_row_id) {
                    (true, Some(cursor)) => req = PageRequest::before("walk", limit, cursor),
                    (has_more, _) => {
                        assert!(!has_more);
                        break;
                    }
                }
            }

            let all: Vec<i64> = pages.into_iter().rev().flatten().collect();
            assert_eq!(all, (1..=total as i64).collect::<Vec<_>>(), "total={total}");
        }
    }

    #[tokio::test]
    async fn append_emits_message_received() {
        let (store, publisher) = store_with("s1", 0);
        let mut rx = publisher.subscribe();

        let msg = MessageService::append_message(&store, &publisher, "s1", "user", "hello").unwrap();
        match rx.recv().await.unwrap() {
            SyncEvent::MessageReceived { session_id, message } => {
                assert_eq!(session_id, "s1");
                assert_eq!(message, msg);
            }
            other => panic!("unexpected event {other:?}"),
        }

        let err = MessageService::append_message(&store, &publisher, "nope", "user", "x").unwrap_err();
        assert!(err.is_not_found());
    }
}
