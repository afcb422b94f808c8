// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "framescan")]
#[command(about = "Scan camera frames and images for barcodes")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan image files as if they were camera frames
    Scan {
        /// Config file (default: ~/.config/framescan/config.json if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Downscale images whose larger side exceeds this before scanning
        #[arg(short, long)]
        max_dimension: Option<u32>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,

        /// Image files to scan
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=framescan=trace, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            config,
            max_dimension,
            json,
            images,
        } => cli::scan_images(&images, config.as_deref(), max_dimension, json)?,
    }

    Ok(())
}
