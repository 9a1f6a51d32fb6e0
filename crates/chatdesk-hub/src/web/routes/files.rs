use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;

use super::ok_json;
use crate::web::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/files/browse", get(browse))
}

#[derive(Deserialize)]
struct BrowseQuery {
    dir: Option<String>,
}

async fn browse(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> (StatusCode, Json<Value>) {
    match state.browser.list(query.dir.as_deref()).await {
        Ok(listing) => ok_json(&listing),
        Err(e) => e.into_response_parts("browse"),
    }
}
