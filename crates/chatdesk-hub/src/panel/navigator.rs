use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chatdesk_shared::schemas::{MessagesResponse, Session};
use serde::Serialize;
use tracing::{debug, info};

use super::attach::AttachChannel;
use super::picker::FolderPicker;
use super::session_view::SessionView;
use super::state::PanelState;
use crate::error::{AppError, AppResult};
use crate::files::FilesystemBrowser;
use crate::sync::SyncEngine;
use crate::sync::message_service::{PageLimit, PageRequest};

/// First page size when a session is opened.
const INITIAL_PAGE_LIMIT: i64 = 100;

/// Handle for one in-flight navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTicket {
    generation: u64,
    pub session_id: String,
}

/// Handle for one in-flight "load earlier" fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarlierTicket {
    generation: u64,
    pub session_id: String,
    pub cursor: i64,
}

#[derive(Debug, Default)]
struct Inner {
    state: PanelState,
    view: SessionView,
    picker: FolderPicker,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSnapshot {
    pub panel: PanelState,
    pub session: SessionView,
}

/// Owner of the single panel state. Writers go through the lock one at a
/// time; the lock is never held across an await.
pub struct PanelNavigator {
    inner: RwLock<Inner>,
    engine: Arc<SyncEngine>,
    browser: FilesystemBrowser,
    attach: AttachChannel,
}

impl PanelNavigator {
    pub fn new(engine: Arc<SyncEngine>, browser: FilesystemBrowser) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            engine,
            browser,
            attach: AttachChannel::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> PanelState {
        self.read().state.clone()
    }

    pub fn session_view(&self) -> SessionView {
        self.read().view.clone()
    }

    pub fn picker(&self) -> FolderPicker {
        self.read().picker.clone()
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        let inner = self.read();
        PanelSnapshot {
            panel: inner.state.clone(),
            session: inner.view.clone(),
        }
    }

    pub fn attach_channel(&self) -> &AttachChannel {
        &self.attach
    }

    // --- Navigation ---

    /// Starts a navigation. Any navigation still in flight becomes stale.
    pub fn begin_navigation(&self, session_id: &str) -> NavigationTicket {
        let mut inner = self.write();
        inner.generation += 1;
        inner.view = SessionView::loading(session_id);
        debug!(session_id, generation = inner.generation, "navigation started");
        NavigationTicket {
            generation: inner.generation,
            session_id: session_id.to_string(),
        }
    }

    /// Applies the session lookup of a navigation started with `ticket`.
    ///
    /// A stale ticket returns `Cancelled` and touches nothing. A failed
    /// lookup leaves the panel untouched and puts the error in the view.
    pub fn open_session(
        &self,
        ticket: &NavigationTicket,
        result: AppResult<Session>,
    ) -> AppResult<PanelState> {
        let mut inner = self.write();
        if inner.generation != ticket.generation {
            debug!(session_id = %ticket.session_id, "stale navigation discarded");
            return Err(AppError::Cancelled);
        }

        match result {
            Ok(session) => {
                inner.state.apply_session(&session);
                inner.view.set_header(&session);
                Ok(inner.state.clone())
            }
            Err(e) => {
                inner.view.fail(&e);
                Err(e)
            }
        }
    }

    /// Applies the first message page. The panel already points at the
    /// session, so a failed fetch only reaches the view.
    pub fn complete_navigation(
        &self,
        ticket: &NavigationTicket,
        result: AppResult<MessagesResponse>,
    ) -> AppResult<SessionView> {
        let mut inner = self.write();
        if inner.generation != ticket.generation {
            debug!(session_id = %ticket.session_id, "stale page discarded");
            return Err(AppError::Cancelled);
        }

        match result {
            Ok(page) => {
                inner.view.show_page(page);
                Ok(inner.view.clone())
            }
            Err(e) => {
                inner.view.fail(&e);
                Err(e)
            }
        }
    }

    /// Makes `session_id` the active session and loads its newest page.
    pub async fn navigate_to_session(&self, session_id: &str) -> AppResult<PanelState> {
        let outcome = self.navigate(session_id).await;
        match &outcome {
            Ok(state) => info!(
                session_id,
                working_directory = ?state.working_directory,
                "session opened"
            ),
            Err(e) => e.log("navigate_to_session"),
        }
        outcome
    }

    async fn navigate(&self, session_id: &str) -> AppResult<PanelState> {
        let ticket = self.begin_navigation(session_id);
        let lookup = self.engine.get_session(session_id).await;
        let state = self.open_session(&ticket, lookup)?;

        let page = self.engine.fetch_messages(&PageRequest::newest(
            session_id,
            PageLimit::new(Some(INITIAL_PAGE_LIMIT)),
        ));
        self.complete_navigation(&ticket, page)?;
        Ok(state)
    }

    /// Claims the next older page of the view. `None` when everything is
    /// loaded or a load is already running.
    pub fn begin_load_earlier(&self) -> Option<EarlierTicket> {
        let mut inner = self.write();
        let (Some(session_id), Some(cursor)) =
            (inner.view.session_id.clone(), inner.view.earlier_cursor())
        else {
            return None;
        };
        inner.view.loading_earlier = true;
        Some(EarlierTicket {
            generation: inner.generation,
            session_id,
            cursor,
        })
    }

    /// Prepends a page claimed with `ticket`. A page for a session that was
    /// navigated away from returns `Cancelled` and touches nothing.
    pub fn complete_load_earlier(
        &self,
        ticket: &EarlierTicket,
        result: AppResult<MessagesResponse>,
    ) -> AppResult<SessionView> {
        let mut inner = self.write();
        if inner.generation != ticket.generation {
            debug!(session_id = %ticket.session_id, "stale earlier page discarded");
            return Err(AppError::Cancelled);
        }
        match result {
            Ok(page) => {
                inner.view.prepend(page);
                Ok(inner.view.clone())
            }
            Err(e) => {
                e.log("load_earlier");
                inner.view.fail(&e);
                Err(e)
            }
        }
    }

    /// Prepends the next older page to the view. A no-op when everything is
    /// loaded or a load is already running.
    pub async fn load_earlier(&self) -> AppResult<SessionView> {
        let Some(ticket) = self.begin_load_earlier() else {
            return Ok(self.session_view());
        };
        let result = self.engine.fetch_messages(&PageRequest::before(
            ticket.session_id.as_str(),
            PageLimit::new(Some(INITIAL_PAGE_LIMIT)),
            ticket.cursor,
        ));
        self.complete_load_earlier(&ticket, result)
    }

    // --- Panel ---

    pub fn toggle_preview(&self, path: &str) -> PanelState {
        let mut inner = self.write();
        inner.state.toggle_preview(path);
        inner.state.clone()
    }

    pub fn set_panel_open(&self, open: bool) -> PanelState {
        let mut inner = self.write();
        inner.state.set_panel_open(open);
        inner.state.clone()
    }

    /// Asks the composer to attach `path`. Does not touch panel state.
    pub fn request_file_attach(&self, path: &str) -> bool {
        self.attach.publish(path)
    }

    // --- Folder picker ---

    /// Browses `target` in the picker. On failure the previous listing stays.
    pub async fn browse_folder(&self, target: Option<String>) -> AppResult<FolderPicker> {
        let ticket = self.write().picker.begin_browse(target);
        let result = self.browser.list(ticket.target.as_deref()).await;

        let mut inner = self.write();
        inner.picker.apply(&ticket, result)?;
        Ok(inner.picker.clone())
    }
}
