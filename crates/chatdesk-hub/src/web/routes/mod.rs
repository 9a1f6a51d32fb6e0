pub mod events;
pub mod files;
pub mod messages;
pub mod panel;
pub mod sessions;

use axum::Router;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{Value, json};

use crate::web::AppState;

/// Build the /api router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(sessions::router())
        .merge(messages::router())
        .merge(files::router())
        .merge(panel::router())
        .merge(events::router())
}

pub(crate) fn invalid_body() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid body" })),
    )
}

pub(crate) fn ok_json<T: serde::Serialize>(value: &T) -> (StatusCode, Json<Value>) {
    match serde_json::to_value(value) {
        Ok(v) => (StatusCode::OK, Json(v)),
        Err(e) => crate::error::AppError::Internal(e.into()).into_response_parts("serialize"),
    }
}
