//! Stillpoint CLI - Command-line interface
//!
//! Provides command-line access to the Stillpoint audio server.

mod commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "stillpoint")]
#[command(about = "A range-aware audio streaming server")]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::handle_command(cli.command).await
}
