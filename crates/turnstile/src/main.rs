// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turnstile - queue-management backend for walk-in service centres.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use turnstile_config::{ConfigError, TurnstileConfig};

/// Turnstile - queue-management backend for walk-in service centres.
#[derive(Parser, Debug)]
#[command(name = "turnstile", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP/WebSocket server.
    Serve,
    /// Validate the configuration and print a summary.
    CheckConfig,
}

fn load(path: Option<&PathBuf>) -> Result<TurnstileConfig, Vec<ConfigError>> {
    match path {
        Some(path) => turnstile_config::load_and_validate_path(path),
        None => turnstile_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            turnstile_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Commands::Serve) => match serve::run_serve(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("turnstile: {e}");
                ExitCode::FAILURE
            }
        },
        Some(Commands::CheckConfig) => {
            println!("{}", summary(&config));
            ExitCode::SUCCESS
        }
        None => {
            println!("turnstile: use --help for available commands");
            ExitCode::SUCCESS
        }
    }
}

fn summary(config: &TurnstileConfig) -> String {
    format!(
        "configuration ok\n  gateway: {}:{} (bearer token {})\n  database: {}\n  \
         directory: {} departments, {} services, {} counters",
        config.gateway.host,
        config.gateway.port,
        if config.gateway.bearer_token.is_some() { "set" } else { "missing" },
        config.storage.database_path,
        config.directory.departments.len(),
        config.directory.services.len(),
        config.directory.counters.len(),
    )
}
