//! HTTP server assembly for Stillpoint.
//!
//! Builds the router, scans the audio library once at startup, and hands
//! the listener to axum. All shared state lives in [`AppState`] and is
//! injected into handlers explicitly; there are no process-wide
//! singletons.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::get;
use stillpoint_core::config::StillpointConfig;
use stillpoint_core::library::AudioLibrary;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::handlers::{api_library, api_stats, api_track, health, stream_track};

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<RwLock<AudioLibrary>>,
    pub config: StillpointConfig,
    pub server_started_at: Instant,
}

impl AppState {
    pub fn new(library: AudioLibrary, config: StillpointConfig) -> Self {
        Self {
            library: Arc::new(RwLock::new(library)),
            config,
            server_started_at: Instant::now(),
        }
    }
}

/// Builds the Stillpoint router. Exposed separately from [`run_server`]
/// so tests can drive it without a listener.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Audio delivery
        .route("/audio/{track_id}", get(stream_track))
        // JSON API
        .route("/api/library", get(api_library))
        .route("/api/tracks/{track_id}", get(api_track))
        .route("/api/stats", get(api_stats))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Scans the library and serves HTTP until the process is stopped.
///
/// # Errors
/// - `StillpointError::Library` - The library root cannot be scanned
/// - `StillpointError::Io` - The listener cannot bind or serve
pub async fn run_server(config: StillpointConfig) -> stillpoint_core::Result<()> {
    let mut library = AudioLibrary::new();
    let count = library.scan_directory(&config.library.root_dir).await?;
    info!(
        "Serving {} tracks from {}",
        count,
        config.library.root_dir.display()
    );

    let addr = SocketAddr::new(config.server.bind_addr, config.server.port);
    let state = AppState::new(library, config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Stillpoint audio server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
