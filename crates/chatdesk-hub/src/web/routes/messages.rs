use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;

use super::ok_json;
use crate::sync::message_service::{PageLimit, PageRequest, parse_cursor};
use crate::web::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sessions/{id}/messages", get(list_messages))
}

/// Raw strings so that a malformed number reads as "absent" instead of
/// rejecting the request.
#[derive(Deserialize)]
struct MessagesQuery {
    limit: Option<String>,
    before: Option<String>,
}

async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> (StatusCode, Json<Value>) {
    let req = PageRequest {
        session_id: id,
        limit: PageLimit::parse(query.limit.as_deref()),
        before_row_id: parse_cursor(query.before.as_deref()),
    };

    match state.sync_engine.fetch_messages(&req) {
        Ok(page) => ok_json(&page),
        Err(e) => e.into_response_parts("list_messages"),
    }
}
