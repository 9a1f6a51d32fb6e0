use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::{AppState, build_router};
use crate::files::FilesystemBrowser;
use crate::store::Store;
use crate::store::types::NewSession;
use crate::sync::SyncEngine;

struct Harness {
    state: AppState,
    store: Arc<Store>,
    _root: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("projects")).unwrap();
        std::fs::create_dir(root.path().join("Documents")).unwrap();
        std::fs::write(root.path().join("todo.txt"), "x").unwrap();

        let store = Arc::new(Store::new_in_memory().unwrap());
        let engine = Arc::new(SyncEngine::new(store.clone()).unwrap());
        let browser = FilesystemBrowser::new(root.path().to_path_buf());
        let state = AppState::new(engine, browser, vec!["http://localhost:3210".into()]);
        Self {
            state,
            store,
            _root: root,
        }
    }

    async fn seed(&self, session_id: &str, working_directory: Option<&str>, messages: usize) {
        let engine = &self.state.sync_engine;
        let init = NewSession {
            working_directory,
            ..Default::default()
        };
        engine.get_or_create_session(session_id, &init).await.unwrap();
        for i in 0..messages {
            engine
                .append_message(session_id, "user", &format!("message {}", i + 1))
                .await
                .unwrap();
        }
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        (status, response_json(response).await.unwrap())
    }
}

async fn response_json(response: axum::response::Response) -> Result<Value> {
    let collected = response.into_body().collect().await?;
    let bytes = collected.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

fn row_ids(body: &Value) -> Vec<i64> {
    body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["row_id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_is_ok() {
    let h = Harness::new();
    let (status, body) = h.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn pages_through_120_messages() {
    let h = Harness::new();
    h.seed("s1", None, 120).await;

    let (status, first) = h.get("/api/sessions/s1/messages?limit=100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row_ids(&first), (21..=120).collect::<Vec<_>>());
    assert_eq!(first["hasMore"], true);
    assert_eq!(first["nextBeforeRowId"], 21);

    let (_, second) = h.get("/api/sessions/s1/messages?limit=100&before=21").await;
    assert_eq!(row_ids(&second), (1..=20).collect::<Vec<_>>());
    assert_eq!(second["hasMore"], false);
}

#[tokio::test]
async fn bad_pagination_params_are_normalized() {
    let h = Harness::new();
    h.seed("s1", None, 120).await;

    let (status, body) = h.get("/api/sessions/s1/messages?limit=abc&before=xyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row_ids(&body).len(), 100);

    let (_, body) = h.get("/api/sessions/s1/messages?limit=0").await;
    assert_eq!(row_ids(&body), vec![120]);

    let (_, body) = h.get("/api/sessions/s1/messages?limit=100000&before=0").await;
    assert_eq!(row_ids(&body).len(), 120);
    assert_eq!(body["hasMore"], false);

    let (status, body) = h.get("/api/sessions/s1/messages?before=-5").await;
    assert_eq!(status, StatusCode::OK);
    assert!(row_ids(&body).is_empty());
    assert_eq!(body["hasMore"], false);
}

#[tokio::test]
async fn missing_session_messages_is_404() {
    let h = Harness::new();
    let (status, body) = h.get("/api/sessions/missing-session/messages?limit=50").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Session not found" }));
}

#[tokio::test]
async fn externally_deleted_session_is_404_everywhere() {
    let h = Harness::new();
    h.seed("b", None, 3).await;
    let (status, _) = h.get("/api/sessions/b").await;
    assert_eq!(status, StatusCode::OK);

    h.store
        .conn()
        .execute("DELETE FROM sessions WHERE id = 'b'", [])
        .unwrap();

    let (status, body) = h.get("/api/sessions/b").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Session not found" }));
    let (status, _) = h.get("/api/sessions/b/messages").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_session_is_200() {
    let h = Harness::new();
    h.seed("fresh", None, 0).await;
    let (status, body) = h.get("/api/sessions/fresh/messages").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"], json!([]));
    assert_eq!(body["hasMore"], false);
    assert!(body["nextBeforeRowId"].is_null());
}

#[tokio::test]
async fn session_crud() {
    let h = Harness::new();

    let (status, created) = h
        .send_json(
            "POST",
            "/api/sessions",
            json!({ "id": "s9", "model": "sonnet", "workingDirectory": "/work/s9" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["session"]["id"], "s9");
    assert_eq!(created["session"]["mode"], "code");
    assert_eq!(created["session"]["working_directory"], "/work/s9");

    let (status, generated) = h.send_json("POST", "/api/sessions", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!generated["session"]["id"].as_str().unwrap().is_empty());

    let (status, patched) = h
        .send_json("PATCH", "/api/sessions/s9", json!({ "title": "Renamed", "working_directory": null }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["session"]["title"], "Renamed");
    assert!(patched["session"]["working_directory"].is_null());

    let (status, fetched) = h.get("/api/sessions/s9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["session"]["title"], "Renamed");

    let (_, list) = h.get("/api/sessions").await;
    assert_eq!(list["sessions"].as_array().unwrap().len(), 2);

    let (status, _) = h.get("/api/sessions/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = h
        .send_json("PATCH", "/api/sessions/nope", json!({ "title": "x" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_400() {
    let h = Harness::new();
    let request = Request::post("/api/sessions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = h.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid body");
}

#[tokio::test]
async fn browse_lists_directories() {
    let h = Harness::new();

    let (status, body) = h.get("/api/files/browse").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["directories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Documents", "projects"]);
    assert!(body["parent"].is_string());
    assert!(body.get("drives").is_none() || cfg!(windows));

    let (status, _) = h.get("/api/files/browse?dir=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = h.get("/api/files/browse?dir=todo.txt").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn panel_navigation_flow() {
    let h = Harness::new();
    h.seed("a", Some("/work/a"), 3).await;
    h.seed("b", None, 0).await;

    let (_, initial) = h.get("/api/panel").await;
    assert_eq!(initial["panel"]["panelOpen"], false);

    let (status, snap) = h
        .send_json("POST", "/api/panel/navigate", json!({ "sessionId": "a" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["panel"]["activeSessionId"], "a");
    assert_eq!(snap["panel"]["workingDirectory"], "/work/a");
    assert_eq!(snap["panel"]["sessionTitle"], "New Conversation");
    assert_eq!(snap["session"]["messages"].as_array().unwrap().len(), 3);

    let (_, preview) = h
        .send_json("POST", "/api/panel/preview", json!({ "path": "/work/a/README.md" }))
        .await;
    assert_eq!(preview["panel"]["previewFile"], "/work/a/README.md");
    let (_, png) = h
        .send_json("POST", "/api/panel/preview", json!({ "path": "/work/a/logo.png" }))
        .await;
    assert_eq!(png["panel"]["previewFile"], "/work/a/README.md");

    let (_, snap) = h
        .send_json("POST", "/api/panel/navigate", json!({ "sessionId": "b" }))
        .await;
    assert_eq!(snap["panel"]["workingDirectory"], "/work/a");
    assert!(snap["panel"]["previewFile"].is_null());

    let (status, body) = h
        .send_json("POST", "/api/panel/navigate", json!({ "sessionId": "missing-session" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");
    let (_, after) = h.get("/api/panel").await;
    assert_eq!(after["panel"]["activeSessionId"], "b");
    assert_eq!(after["session"]["error"]["action"], "start-new-chat");

    let (_, closed) = h
        .send_json("POST", "/api/panel/open", json!({ "open": false }))
        .await;
    assert_eq!(closed["panel"]["panelOpen"], false);
}

#[tokio::test]
async fn attach_without_listeners_is_not_delivered() {
    let h = Harness::new();
    let (status, body) = h
        .send_json("POST", "/api/panel/attach", json!({ "path": "/work/a/x.rs" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], false);

    let mut rx = h.state.panel.attach_channel().subscribe();
    let (_, body) = h
        .send_json("POST", "/api/panel/attach", json!({ "path": "/work/a/y.rs" }))
        .await;
    assert_eq!(body["delivered"], true);
    assert_eq!(rx.recv().await.unwrap().path, "/work/a/y.rs");
}

#[tokio::test]
async fn picker_browse_keeps_last_listing() {
    let h = Harness::new();
    let (status, picker) = h.send_json("POST", "/api/panel/picker", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(picker["directories"].as_array().unwrap().len(), 2);

    let (status, _) = h
        .send_json("POST", "/api/panel/picker", json!({ "dir": "missing" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, after) = h.get("/api/panel/picker").await;
    assert_eq!(after["current"], picker["current"]);
    assert_eq!(after["lastError"], "Directory not found");
}

#[tokio::test]
async fn events_stream_opens() {
    let h = Harness::new();
    let response = build_router(h.state.clone())
        .oneshot(Request::get("/api/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
}
