// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depth-sense")]
#[command(about = "Depth sensing ingestion and queries for immersive sessions")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// JSON configuration file (defaults are used for missing fields)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a synthetic session and report depth queries
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u32,

        /// Number of views (1 = mono, 2 = stereo)
        #[arg(short, long, default_value = "2")]
        views: usize,

        /// Deliver depth as GPU textures instead of CPU buffers
        #[arg(long)]
        gpu: bool,

        /// Enable live mesh reconstruction
        #[arg(long)]
        mesh: bool,

        /// Write a visualization of view 0's final depth
        #[arg(long)]
        png: Option<PathBuf>,

        /// Grayscale visualization instead of the turbo colormap
        #[arg(long)]
        grayscale: bool,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=depth_sense=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            frames,
            views,
            gpu,
            mesh,
            png,
            grayscale,
        } => cli::simulate(
            config,
            cli::SimulationOptions {
                frames,
                views,
                gpu,
                mesh,
                png,
                grayscale,
            },
        ),
        Commands::Config => cli::print_config(&config),
    }
}
