//! Centralized configuration for Stillpoint.
//!
//! All tunable parameters are defined here to avoid hard-coded values
//! scattered throughout the codebase.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Central configuration for all Stillpoint components.
///
/// Groups related settings into logical sections and supports
/// environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct StillpointConfig {
    pub server: ServerConfig,
    pub library: LibraryConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: IpAddr,
    /// Port the HTTP listener binds to
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
        }
    }
}

/// Audio library configuration.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Directory scanned for audio files at startup
    pub root_dir: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("library"),
        }
    }
}

impl StillpointConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("STILLPOINT_PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            config.server.port = port;
        }

        if let Ok(addr) = std::env::var("STILLPOINT_BIND_ADDR")
            && let Ok(addr) = addr.parse::<IpAddr>()
        {
            config.server.bind_addr = addr;
        }

        if let Ok(dir) = std::env::var("STILLPOINT_LIBRARY_DIR") {
            config.library.root_dir = PathBuf::from(dir);
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Binds to an ephemeral port so parallel test runs do not collide.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 0,
            },
            ..Default::default()
        }
    }
}
