//! HTTP request handlers organized by functionality

pub mod api;
pub mod audio;

// Re-export handler functions
pub use api::{Stats, api_library, api_stats, api_track, health};
pub use audio::stream_track;
