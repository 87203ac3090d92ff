// SPDX-FileCopyrightText: 2026 Polling SDK Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! polling - headless host for the Polling survey SDK.
//!
//! Runs the SDK against the real survey service, with popups printed to the
//! terminal and frame messages read from stdin.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod inspect;
mod run;
mod surface;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use polling_config::PollingConfig;

/// polling - headless host for the Polling survey SDK.
#[derive(Parser, Debug)]
#[command(name = "polling", version, about, long_about = None)]
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
    /// Run the SDK: poll, show due surveys, and read host commands from stdin.
    Run,
    /// Submit one analytics event and schedule any surveys it triggers.
    LogEvent {
        /// Event name, e.g. "Purchase".
        name: String,
        /// Optional event value.
        #[arg(default_value = "")]
        value: String,
    },
    /// Print stored survey answers (all, or one survey).
    Results {
        survey_id: Option<String>,
    },
    /// Print the stored triggered surveys.
    Triggers,
}

fn load_config(path: Option<&PathBuf>) -> PollingConfig {
    let loaded = match path {
        Some(path) => polling_config::load_and_validate_path(path),
        None => polling_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            polling_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("polling={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.sdk.log_level);

    let result = match cli.command {
        Commands::Run => run::run(&config).await,
        Commands::LogEvent { name, value } => run::log_event(&config, &name, &value).await,
        Commands::Results { survey_id } => inspect::results(&config, survey_id.as_deref()).await,
        Commands::Triggers => inspect::triggers(&config).await,
    };

    if let Err(e) = result {
        eprintln!("polling: {e}");
        std::process::exit(1);
    }
}
