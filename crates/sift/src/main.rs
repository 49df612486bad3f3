//! Sift - live log severity fan-out
//!
//! # Usage
//!
//! ```bash
//! # Run the server (default)
//! sift
//! sift --config configs/sift.toml
//!
//! # Explicit subcommand
//! sift serve --config configs/sift.toml
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Sift - live log severity fan-out
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file
    #[arg(short, long, default_value = "configs/sift.toml")]
    config: std::path::PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the sift server
    Serve(cmd::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve(args)) => cmd::serve::run(args).await,
        // No subcommand = run the server (default behavior)
        None => {
            cmd::serve::run(cmd::serve::ServeArgs {
                config: cli.config,
                log_level: cli.log_level,
            })
            .await
        }
    }
}
