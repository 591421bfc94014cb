//! dumpmirror - local mirror of published dump archives
//!
//! Discovers dump files on a remote listing page, downloads the ones that
//! changed, unpacks them into a canonical directory and prunes old versions,
//! once or on a recurring schedule.

use clap::Parser;
use std::path::PathBuf;

mod catalog;
mod cli;
mod commands;
mod common;
mod config;
mod error;
mod fetch;
mod hash;
mod logging;
mod progress;
mod remote;
mod resources;
mod retention;
mod scheduler;
mod status;
mod sync;
mod unpack;

use cli::{Cli, Commands};
use config::{Config, LoggingConfig};
use error::Result;
use tracing_appender::non_blocking::WorkerGuard;

/// Load the configuration and install logging.
///
/// The returned guard must outlive every log call.
fn load(explicit: Option<PathBuf>, verbose: bool) -> Result<(Config, Option<WorkerGuard>)> {
    let config_path = config::resolve_config_path(explicit)?;
    let config = Config::load(&config_path)?;
    let guard = logging::init(&config.logging, verbose)?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");
    for warning in config.warnings() {
        tracing::warn!("{warning}");
    }
    Ok((config, guard))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync(args) => {
            let (config, _guard) = load(cli.config, cli.verbose)?;
            commands::sync::run(config, args)
        }
        Commands::Service => {
            let (config, _guard) = load(cli.config, cli.verbose)?;
            commands::service::run(&config)
        }
        Commands::Status(args) => {
            let (config, _guard) = load(cli.config, cli.verbose)?;
            commands::status::run(&config, args)
        }
        Commands::Init(args) => {
            // Runs without loading, so a broken file can be replaced with --force
            let config_path = config::resolve_config_path(cli.config)?;
            let _guard = logging::init(&LoggingConfig::default(), cli.verbose)?;
            commands::init::run(&config_path, args)
        }
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
