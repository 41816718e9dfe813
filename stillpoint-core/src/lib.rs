//! Stillpoint Core - audio library and streaming functionality
//!
//! This crate provides the building blocks for the Stillpoint audio
//! server: library scanning, range-aware file streaming, configuration
//! management, and tracing setup.

pub mod config;
pub mod library;
pub mod streaming;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::StillpointConfig;
pub use library::{AudioLibrary, AudioTrack, LibraryError, TrackId};
pub use streaming::{FileUnavailable, stream_file};

/// Errors that can bubble up from any Stillpoint subsystem.
#[derive(Debug, thiserror::Error)]
pub enum StillpointError {
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Streaming error: {0}")]
    Streaming(#[from] FileUnavailable),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StillpointError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            StillpointError::Library(LibraryError::InvalidTrackId { value }) => {
                format!("Invalid track id: {value}")
            }
            StillpointError::Library(_) => "Library error occurred".to_string(),
            StillpointError::Streaming(e) => {
                format!("Audio file unavailable: {}", e.path.display())
            }
            StillpointError::Configuration { reason } => {
                format!("Configuration error: {reason}")
            }
            StillpointError::Io(_) => "File system error occurred".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StillpointError>;
