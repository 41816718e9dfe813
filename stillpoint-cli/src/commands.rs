//! CLI subcommands for serving and inspecting the audio library.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Subcommand;
use stillpoint_core::config::StillpointConfig;
use stillpoint_core::library::AudioLibrary;
use stillpoint_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the library and serve it over HTTP
    Serve {
        /// Directory containing audio files
        #[arg(long)]
        library: Option<PathBuf>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Address to bind to
        #[arg(long)]
        bind: Option<IpAddr>,
        /// Console log level
        #[arg(long, default_value_t = CliLogLevel::Info)]
        log_level: CliLogLevel,
    },
    /// Scan the library and print what a serve run would expose
    Scan {
        /// Directory containing audio files
        #[arg(long)]
        library: Option<PathBuf>,
    },
}

pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            library,
            port,
            bind,
            log_level,
        } => {
            init_tracing(log_level.as_tracing_level(), None)?;

            // Environment first, CLI flags win
            let mut config = StillpointConfig::from_env();
            if let Some(library) = library {
                config.library.root_dir = library;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }

            stillpoint_web::run_server(config).await?;
            Ok(())
        }
        Commands::Scan { library } => {
            let mut config = StillpointConfig::from_env();
            if let Some(library) = library {
                config.library.root_dir = library;
            }

            let mut audio_library = AudioLibrary::new();
            let count = audio_library
                .scan_directory(&config.library.root_dir)
                .await?;

            println!(
                "{} tracks under {}",
                count,
                config.library.root_dir.display()
            );
            for track in audio_library.all_tracks() {
                println!(
                    "  {}  {:>10}  {}  ({})",
                    track.track_id, track.size, track.title, track.content_type
                );
            }
            Ok(())
        }
    }
}
