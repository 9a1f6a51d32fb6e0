pub mod routes;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::files::FilesystemBrowser;
use crate::panel::PanelNavigator;
use crate::sync::SyncEngine;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub sync_engine: Arc<SyncEngine>,
    pub panel: Arc<PanelNavigator>,
    pub browser: FilesystemBrowser,
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        sync_engine: Arc<SyncEngine>,
        browser: FilesystemBrowser,
        cors_origins: Vec<String>,
    ) -> Self {
        let panel = Arc::new(PanelNavigator::new(sync_engine.clone(), browser.clone()));
        Self {
            sync_engine,
            panel,
            browser,
            cors_origins,
        }
    }
}

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    let allow_origin = if cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<axum::http::HeaderValue> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_origin(allow_origin)
}

/// Build the axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = routes::api_router().layer(cors_layer(&state.cors_origins));

    Router::new()
        .route(
            "/health",
            axum::routing::get(|| async { axum::Json(serde_json::json!({ "status": "ok" })) }),
        )
        .nest("/api", api_routes)
        .with_state(state)
}
