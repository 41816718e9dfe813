//! Audio delivery handler.
//!
//! Resolves a track id against the library and delegates the byte
//! serving to the core range-aware streamer. Authorization, when the
//! deployment has any, happens in middleware before this handler runs.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use stillpoint_core::library::TrackId;
use stillpoint_core::streaming::stream_file;
use tracing::{debug, warn};

use crate::handlers::api::error_response;
use crate::server::AppState;

/// `GET /audio/{track_id}` - serve a track, honoring `Range` headers.
pub async fn stream_track(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let track_id = match TrackId::from_hex(&track_id) {
        Ok(id) => id,
        Err(_) => {
            return error_response(StatusCode::BAD_REQUEST, "invalid track id");
        }
    };

    let track = {
        let library = state.library.read().await;
        library.track(track_id).cloned()
    };
    let Some(track) = track else {
        return error_response(StatusCode::NOT_FOUND, "unknown track");
    };

    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());
    debug!(
        "Streaming {} ({}): range={:?}",
        track.title, track_id, range_header
    );

    match stream_file(&track.file_path, range_header, Some(track.content_type)).await {
        Ok(response) => response,
        Err(e) => {
            // Track indexed at scan time but gone now; the library and
            // the filesystem have drifted.
            warn!("Track {} unavailable: {}", track_id, e);
            error_response(StatusCode::NOT_FOUND, "track file unavailable")
        }
    }
}
