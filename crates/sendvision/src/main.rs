// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SendVision - operational dashboard for classified inbound email.
//!
//! This is the binary entry point. It loads a JSON export of the
//! classification table and prints live statistics or an operator queue.

mod export;
mod queue;
mod stats;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::queue::QueueKind;

/// SendVision - operational dashboard for classified inbound email.
#[derive(Parser, Debug)]
#[command(name = "sendvision", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show live statistics and chart breakdowns for a time window.
    Stats {
        /// JSON export of the classification table.
        #[arg(long)]
        records: PathBuf,
        /// First day of the window (defaults to today minus the configured window).
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day of the window, included in full (defaults to today).
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// List an operator work queue, oldest first.
    Queue {
        /// JSON export of the classification table.
        #[arg(long)]
        records: PathBuf,
        /// Which queue to list.
        #[arg(long, value_enum)]
        kind: QueueKind,
        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => sendvision_config::load_and_validate_path(path),
        None => sendvision_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            sendvision_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);
    sendvision_store::describe_metrics();
    sendvision_workflow::describe_metrics();

    let result = match cli.command {
        Commands::Stats {
            records,
            from,
            to,
            json,
            plain,
        } => stats::run_stats(&config, &records, from, to, json, plain).await,
        Commands::Queue {
            records,
            kind,
            json,
        } => queue::run_queue(&config, &records, kind, json).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sendvision={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
