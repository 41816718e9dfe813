//! JSON API handlers for library inspection and server stats.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;
use stillpoint_core::library::{AudioTrack, TrackId};

use crate::server::AppState;

/// Server statistics exposed at `/api/stats`.
#[derive(Serialize)]
pub struct Stats {
    pub track_count: usize,
    pub total_bytes: u64,
    pub uptime_seconds: u64,
}

fn track_json(track: &AudioTrack) -> serde_json::Value {
    json!({
        "track_id": track.track_id.to_string(),
        "title": track.title,
        "size": track.size,
        "content_type": track.content_type,
        "url": format!("/audio/{}", track.track_id),
    })
}

/// `GET /api/library` - list all indexed tracks.
pub async fn api_library(State(state): State<AppState>) -> Json<serde_json::Value> {
    let library = state.library.read().await;
    let tracks: Vec<serde_json::Value> = library.all_tracks().iter().map(|t| track_json(t)).collect();

    Json(json!({ "tracks": tracks }))
}

/// `GET /api/tracks/{track_id}` - detail for one track.
pub async fn api_track(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
) -> Response {
    let Ok(track_id) = TrackId::from_hex(&track_id) else {
        return error_response(StatusCode::BAD_REQUEST, "invalid track id");
    };

    let library = state.library.read().await;
    match library.track(track_id) {
        Some(track) => Json(track_json(track)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "unknown track"),
    }
}

/// `GET /api/stats` - track counts and uptime.
pub async fn api_stats(State(state): State<AppState>) -> Json<Stats> {
    let library = state.library.read().await;

    Json(Stats {
        track_count: library.len(),
        total_bytes: library.total_bytes(),
        uptime_seconds: state.server_started_at.elapsed().as_secs(),
    })
}

/// `GET /health` - liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// Builds a JSON error body with the given status.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "error": message }).to_string(),
        ))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
