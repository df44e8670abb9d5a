//! Crete CLI: build, replay, and validate skateboard motion traces.
//!
//! Usage:
//!   crete trace <POSES>      Build a motion trace from a recorded pose track
//!   crete play <POSES>       Loop the skeleton overlay over the trim window
//!   crete validate <CSV>     Check a tabular motion trace export

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crete_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "crete",
    about = "Pose-tracked skateboard trick analysis",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a motion trace from a recorded pose track
    Trace {
        /// Pose track (JSONL)
        poses: PathBuf,

        /// Trim window start (seconds)
        #[arg(long)]
        start: Option<f64>,

        /// Trim window end (seconds, defaults to the clip end)
        #[arg(long)]
        end: Option<f64>,

        /// Sampling rate (frames per second)
        #[arg(long)]
        fps: Option<u32>,

        /// Write the tabular export here
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the full trace as JSON here
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Replay the overlay for a pose track, looping within the trim window
    Play {
        /// Pose track (JSONL)
        poses: PathBuf,

        /// Trim window start (seconds)
        #[arg(long)]
        start: Option<f64>,

        /// Trim window end (seconds, defaults to the clip end)
        #[arg(long)]
        end: Option<f64>,

        /// How long to play (seconds)
        #[arg(long, default_value = "5.0")]
        seconds: f64,

        /// Overlay redraw rate (Hz)
        #[arg(long)]
        refresh_hz: Option<u32>,
    },

    /// Validate a tabular motion trace export
    Validate {
        /// Path to the CSV export
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_warning) = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    crete_common::logging::init_logging(&logging);
    if let Some(warning) = config_warning {
        tracing::warn!("{warning}, using defaults");
    }

    match cli.command {
        Commands::Trace {
            poses,
            start,
            end,
            fps,
            csv,
            json,
        } => commands::trace::run(&config, poses, start, end, fps, csv, json).await,
        Commands::Play {
            poses,
            start,
            end,
            seconds,
            refresh_hz,
        } => commands::play::run(&config, poses, start, end, seconds, refresh_hz).await,
        Commands::Validate { path } => commands::validate::run(path),
    }
}
