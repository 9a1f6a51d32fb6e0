use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use chatdesk_shared::schemas::SessionUpdate;
use serde::Deserialize;
use serde_json::{Value, json};

use super::invalid_body;
use crate::store::types::NewSession;
use crate::web::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/{id}", get(get_session).patch(update_session))
}

async fn list_sessions(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let sessions = state.sync_engine.list_sessions().await;
    (StatusCode::OK, Json(json!({ "sessions": sessions })))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.sync_engine.get_session(&id).await {
        Ok(session) => (StatusCode::OK, Json(json!({ "session": session }))),
        Err(e) => e.into_response_parts("get_session"),
    }
}

#[derive(Deserialize, Default)]
struct CreateSessionBody {
    id: Option<String>,
    title: Option<String>,
    model: Option<String>,
    mode: Option<String>,
    #[serde(alias = "workingDirectory")]
    working_directory: Option<String>,
}

/// Get-or-create. Without an id a fresh one is generated.
async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionBody>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(body)) = body else {
        return invalid_body();
    };

    let id = body
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let init = NewSession {
        title: body.title.as_deref(),
        model: body.model.as_deref(),
        mode: body.mode.as_deref(),
        working_directory: body.working_directory.as_deref(),
    };

    match state.sync_engine.get_or_create_session(&id, &init).await {
        Ok(session) => (StatusCode::OK, Json(json!({ "session": session }))),
        Err(e) => e.into_response_parts("create_session"),
    }
}

async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SessionUpdate>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(update)) = body else {
        return invalid_body();
    };

    match state.sync_engine.update_session(&id, &update).await {
        Ok(session) => (StatusCode::OK, Json(json!({ "session": session }))),
        Err(e) => e.into_response_parts("update_session"),
    }
}
