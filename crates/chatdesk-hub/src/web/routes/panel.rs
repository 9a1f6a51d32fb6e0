use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{invalid_body, ok_json};
use crate::web::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/panel", get(get_panel))
        .route("/panel/navigate", post(navigate))
        .route("/panel/load-earlier", post(load_earlier))
        .route("/panel/preview", post(toggle_preview))
        .route("/panel/open", post(set_open))
        .route("/panel/attach", post(attach))
        .route("/panel/picker", get(get_picker).post(browse_picker))
}

async fn get_panel(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    ok_json(&state.panel.snapshot())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavigateBody {
    session_id: String,
}

async fn navigate(
    State(state): State<AppState>,
    body: Result<Json<NavigateBody>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(body)) = body else {
        return invalid_body();
    };

    match state.panel.navigate_to_session(&body.session_id).await {
        Ok(_) => ok_json(&state.panel.snapshot()),
        Err(e) => e.into_response_parts("panel_navigate"),
    }
}

async fn load_earlier(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.panel.load_earlier().await {
        Ok(view) => (StatusCode::OK, Json(json!({ "session": view }))),
        Err(e) => e.into_response_parts("panel_load_earlier"),
    }
}

#[derive(Deserialize)]
struct PathBody {
    path: String,
}

async fn toggle_preview(
    State(state): State<AppState>,
    body: Result<Json<PathBody>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(body)) = body else {
        return invalid_body();
    };
    let panel = state.panel.toggle_preview(&body.path);
    (StatusCode::OK, Json(json!({ "panel": panel })))
}

#[derive(Deserialize)]
struct OpenBody {
    open: bool,
}

async fn set_open(
    State(state): State<AppState>,
    body: Result<Json<OpenBody>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(body)) = body else {
        return invalid_body();
    };
    let panel = state.panel.set_panel_open(body.open);
    (StatusCode::OK, Json(json!({ "panel": panel })))
}

async fn attach(
    State(state): State<AppState>,
    body: Result<Json<PathBody>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(body)) = body else {
        return invalid_body();
    };
    if body.path.trim().is_empty() {
        return invalid_body();
    }
    let delivered = state.panel.request_file_attach(&body.path);
    (StatusCode::OK, Json(json!({ "delivered": delivered })))
}

async fn get_picker(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    ok_json(&state.panel.picker())
}

#[derive(Deserialize, Default)]
struct PickerBody {
    dir: Option<String>,
}

async fn browse_picker(
    State(state): State<AppState>,
    body: Result<Json<PickerBody>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(body)) = body else {
        return invalid_body();
    };

    match state.panel.browse_folder(body.dir).await {
        Ok(picker) => ok_json(&picker),
        Err(e) => e.into_response_parts("panel_picker"),
    }
}
