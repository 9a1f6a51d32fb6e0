use std::collections::HashMap;

use chatdesk_shared::schemas::{Session, SessionUpdate, SyncEvent};
use tracing::debug;

use super::event_publisher::EventPublisher;
use crate::error::{AppError, AppResult};
use crate::store::types::NewSession;
use crate::store::{Store, sessions};

/// In-memory view of the sessions table. The store stays the source of
/// truth; entries are refreshed from it on a miss.
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    pub fn reload_all(&mut self, store: &Store) -> AppResult<()> {
        let rows = sessions::get_sessions(&store.conn())?;
        self.sessions = rows
            .into_iter()
            .map(|s| (s.id.clone(), Session::from(s)))
            .collect();
        debug!(count = self.sessions.len(), "session registry loaded");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Most recently updated first, ties by id.
    pub fn list(&self) -> Vec<Session> {
        let mut list: Vec<Session> = self.sessions.values().cloned().collect();
        list.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        list
    }

    /// Cached copy of a session whose row still exists. Rows can be deleted
    /// behind the registry's back, so a hit is confirmed against the store.
    pub fn get_cached(&self, session_id: &str, store: &Store) -> AppResult<Option<Session>> {
        let Some(session) = self.sessions.get(session_id) else {
            return Ok(None);
        };
        if sessions::session_exists(&store.conn(), session_id)? {
            Ok(Some(session.clone()))
        } else {
            Ok(None)
        }
    }

    pub fn get(&mut self, session_id: &str, store: &Store) -> AppResult<Session> {
        if let Some(session) = self.get_cached(session_id, store)? {
            return Ok(session);
        }
        self.refresh(session_id, store)?
            .ok_or_else(|| AppError::session_not_found(session_id))
    }

    /// Re-reads one session from the store. A row that disappeared is
    /// evicted.
    pub fn refresh(&mut self, session_id: &str, store: &Store) -> AppResult<Option<Session>> {
        match sessions::get_session(&store.conn(), session_id)? {
            Some(stored) => {
                let session = Session::from(stored);
                self.sessions
                    .insert(session_id.to_string(), session.clone());
                Ok(Some(session))
            }
            None => {
                self.sessions.remove(session_id);
                Ok(None)
            }
        }
    }

    pub fn get_or_create(
        &mut self,
        session_id: &str,
        init: &NewSession<'_>,
        store: &Store,
        publisher: &EventPublisher,
    ) -> AppResult<Session> {
        if session_id.trim().is_empty() {
            return Err(AppError::InvalidInput("session id must not be empty".into()));
        }

        let (stored, created) = sessions::get_or_create_session(&store.conn(), session_id, init)?;
        let session = Session::from(stored);
        self.sessions
            .insert(session_id.to_string(), session.clone());

        if created {
            debug!(session_id, "session created");
            publisher.emit(SyncEvent::SessionAdded {
                session_id: session_id.to_string(),
                session: session.clone(),
            });
        }
        Ok(session)
    }

    pub fn update(
        &mut self,
        session_id: &str,
        update: &SessionUpdate,
        store: &Store,
        publisher: &EventPublisher,
    ) -> AppResult<Session> {
        let Some(stored) = sessions::update_session(&store.conn(), session_id, update)? else {
            self.sessions.remove(session_id);
            return Err(AppError::session_not_found(session_id));
        };
        let session = Session::from(stored);
        self.sessions
            .insert(session_id.to_string(), session.clone());

        if !update.is_empty() {
            publisher.emit(SyncEvent::SessionUpdated {
                session_id: session_id.to_string(),
                session: session.clone(),
            });
        }
        Ok(session)
    }

    /// Keeps `updated_at` in step after a message was appended.
    pub fn note_activity(&mut self, session_id: &str, at: i64) {
        if let Some(session) = self.sessions.get_mut(session_id) {
            session.updated_at = session.updated_at.max(at);
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
