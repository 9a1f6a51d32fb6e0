use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use chatdesk_shared::schemas::SyncEvent;
use futures::stream::Stream;
use serde_json::json;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};

use crate::web::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(events_handler))
}

/// Sync events and file-attach requests, newest only. Nothing is replayed
/// to a client that connects late.
async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let sync_events = BroadcastStream::new(state.sync_engine.subscribe()).filter_map(|r| match r {
        Ok(event) => Some(event),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!(skipped, "sse subscriber lagged behind sync events");
            None
        }
    });
    let attach_events = BroadcastStream::new(state.panel.attach_channel().subscribe())
        .filter_map(|r| r.ok().map(|a| SyncEvent::FileAttach { path: a.path }));

    debug!("sse subscriber connected");

    let connected = Event::default().data(
        json!({ "type": "connection-changed", "data": { "status": "connected" } }).to_string(),
    );

    let stream = tokio_stream::once(connected)
        .chain(sync_events.merge(attach_events).map(|event| {
            let data = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            Event::default().data(data)
        }))
        .map(Ok);

    Sse::new(stream).keep_alive(KeepAlive::default())
}
