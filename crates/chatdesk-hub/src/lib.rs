pub mod config;
pub mod error;
pub mod files;
pub mod panel;
pub mod store;
pub mod sync;
pub mod web;

use std::sync::Arc;

use anyhow::Context;
use chatdesk_shared::schemas::{BrowseResponse, MessagesResponse};
use tracing::{info, warn};

use config::Configuration;
use files::{FilesystemBrowser, default_root};
use store::Store;
use sync::SyncEngine;
use sync::message_service::{PageLimit, PageRequest};
use web::AppState;

fn open_store(config: &Configuration) -> anyhow::Result<Arc<Store>> {
    let store = Store::new(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;
    Ok(Arc::new(store))
}

fn browser_for(config: &Configuration) -> FilesystemBrowser {
    FilesystemBrowser::new(default_root(config.browse_root.as_deref()))
}

pub async fn run_hub() -> anyhow::Result<()> {
    let config = Configuration::create()?;

    info!(
        port = config.listen_port,
        host = %config.listen_host,
        public_url = %config.public_url,
        db = %config.db_path.display(),
        "starting hub"
    );

    let store = open_store(&config)?;
    let sync_engine = Arc::new(SyncEngine::new(store)?);
    let browser = browser_for(&config);
    info!(root = %browser.default_root().display(), "file browser ready");

    let state = AppState::new(sync_engine, browser, config.cors_origins.clone());
    let app = web::build_router(state);

    let addr = format!("{}:{}", config.listen_host, config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");
    info!(url = %config.public_url, "hub ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hub stopped");
    Ok(())
}

/// One directory listing, as `GET /api/files/browse` would return it.
pub async fn run_browse(dir: Option<String>) -> anyhow::Result<BrowseResponse> {
    let config = Configuration::create()?;
    let listing = browser_for(&config).list(dir.as_deref()).await?;
    Ok(listing)
}

/// One page of messages, as `GET /api/sessions/{id}/messages` would return it.
pub fn run_messages(
    session_id: &str,
    limit: Option<i64>,
    before: Option<i64>,
) -> anyhow::Result<MessagesResponse> {
    let config = Configuration::create()?;
    let store = open_store(&config)?;
    let req = PageRequest {
        session_id: session_id.to_string(),
        limit: PageLimit::new(limit),
        before_row_id: before.filter(|&r| r != 0),
    };
    let page = sync::message_service::MessageService::fetch_page(&store, &req)?;
    Ok(page)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
