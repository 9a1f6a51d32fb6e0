pub mod event_publisher;
pub mod message_service;
pub mod session_registry;

use std::sync::Arc;

use chatdesk_shared::schemas::{Message, MessagesResponse, Session, SessionUpdate, SyncEvent};
use tokio::sync::{RwLock, broadcast};

use crate::error::AppResult;
use crate::store::Store;
use crate::store::types::NewSession;
use event_publisher::EventPublisher;
use message_service::{MessageService, PageRequest};
use session_registry::SessionRegistry;

/// Coordinates sessions, message pages and change events.
///
/// Shared as `Arc<SyncEngine>`. The registry lock is never held across an
/// await point.
pub struct SyncEngine {
    store: Arc<Store>,
    publisher: EventPublisher,
    registry: RwLock<SessionRegistry>,
}

impl SyncEngine {
    pub fn new(store: Arc<Store>) -> AppResult<Self> {
        let mut registry = SessionRegistry::new();
        registry.reload_all(&store)?;

        Ok(Self {
            store,
            publisher: EventPublisher::new(),
            registry: RwLock::new(registry),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.publisher.subscribe()
    }

    // --- Sessions ---

    pub async fn list_sessions(&self) -> Vec<Session> {
        self.registry.read().await.list()
    }

    pub async fn get_session(&self, session_id: &str) -> AppResult<Session> {
        if let Some(session) = self
            .registry
            .read()
            .await
            .get_cached(session_id, &self.store)?
        {
            return Ok(session);
        }
        self.registry.write().await.get(session_id, &self.store)
    }

    pub async fn get_or_create_session(
        &self,
        session_id: &str,
        init: &NewSession<'_>,
    ) -> AppResult<Session> {
        self.registry
            .write()
            .await
            .get_or_create(session_id, init, &self.store, &self.publisher)
    }

    pub async fn update_session(
        &self,
        session_id: &str,
        update: &SessionUpdate,
    ) -> AppResult<Session> {
        self.registry
            .write()
            .await
            .update(session_id, update, &self.store, &self.publisher)
    }

    // --- Messages ---

    pub fn fetch_messages(&self, req: &PageRequest) -> AppResult<MessagesResponse> {
        MessageService::fetch_page(&self.store, req)
    }

    pub async fn append_message(
        &self,
        session_id: &str,
        role: &str,
        content: &str,
    ) -> AppResult<Message> {
        let message =
            MessageService::append_message(&self.store, &self.publisher, session_id, role, content)?;
        self.registry
            .write()
            .await
            .note_activity(session_id, message.created_at);
        Ok(message)
    }
}
