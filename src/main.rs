// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depth-gauge")]
#[command(about = "Underwater depth gauge for a multiplayer world")]
#[command(version = depth_gauge::constants::app_info::version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gauge against a simulated dive
    Run {
        /// Settings file (default: ~/.config/depth-gauge/player_settings.json)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Tracking period in milliseconds
        #[arg(short, long, default_value = "100")]
        interval_ms: u64,

        /// Absolute height of sea level
        #[arg(long, default_value = "115")]
        sea_level: f64,

        /// Do not compute depth below sea level
        #[arg(long)]
        no_sea_level: bool,
    },

    /// Print the gauge computed for a depth
    Gauge {
        /// Local depth (positive = below the entry point)
        #[arg(allow_negative_numbers = true)]
        depth: f64,

        /// Whole-number labels instead of tenths
        #[arg(long)]
        integer: bool,
    },

    /// Apply a wdepth command to the stored settings of a subject
    Settings {
        /// Subject UUID
        subject: String,

        /// Command arguments, e.g. `sea off`; none prints the settings
        args: Vec<String>,

        /// Settings file (default: ~/.config/depth-gauge/player_settings.json)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Show a forced measurement and print the resulting HUD fields
    TestDepth {
        /// Subject UUID
        subject: String,

        /// Depth to show (clamped to 0-115, default 10)
        #[arg(allow_negative_numbers = true)]
        depth: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depth_gauge=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            settings,
            interval_ms,
            sea_level,
            no_sea_level,
        } => cli::run_simulation(
            settings,
            interval_ms,
            (!no_sea_level).then_some(sea_level),
        ),
        Commands::Gauge { depth, integer } => cli::print_gauge(depth, !integer),
        Commands::Settings {
            subject,
            args,
            settings,
        } => cli::apply_settings(&subject, &args, settings),
        Commands::TestDepth { subject, depth } => cli::test_depth(&subject, depth.as_deref()),
    }
}
