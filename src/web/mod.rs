//! Web UI: one embedded page plus a small JSON API.
//!
//! ```text
//! GET  /                     page
//! GET  /api/state            session view (JSON)
//! POST /api/convert          multipart upload → session view (JSON)
//! GET  /api/progress         OCR progress of this session (JSON)
//! GET  /download/:slot       primary | secondary as text/plain attachment
//! ```

pub mod handlers;
pub mod page;
pub mod sessions;

use crate::config::ConversionConfig;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use sessions::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Default upload limit in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ConversionConfig>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config: Arc::new(config),
            sessions: SessionStore::new(),
        }
    }
}

/// Build the router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::state))
        .route("/api/progress", get(handlers::progress))
        .route("/api/convert", post(handlers::convert))
        .route("/download/:slot", get(handlers::download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(
    addr: SocketAddr,
    config: ConversionConfig,
    max_upload_bytes: usize,
) -> std::io::Result<()> {
    let app = router(AppState::new(config), max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
