//! CLI definitions using clap derive API
//!
//! Argument types live in one submodule per command:
//! - sync: Sync command arguments
//! - status: Status command arguments
//! - init: Init command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod init;
pub mod status;
pub mod sync;

pub use completions::CompletionsArgs;
pub use init::InitArgs;
pub use status::StatusArgs;
pub use sync::SyncArgs;

/// dumpmirror - local mirror of published dump archives
///
/// Keeps a periodically refreshed, unpacked copy of selected dump files.
#[derive(Parser, Debug)]
#[command(
    name = "dumpmirror",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Mirror large dump archives from a remote listing",
    long_about = "dumpmirror discovers dump files on a remote listing page, downloads the ones \
                  that changed, unpacks them into a stable canonical directory and prunes old \
                  versions, either once or on a recurring schedule.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  dumpmirror init                        \x1b[90m# Write the default configuration\x1b[0m\n   \
                  dumpmirror sync                        \x1b[90m# Run one synchronization cycle\x1b[0m\n   \
                  dumpmirror sync --no-unpack            \x1b[90m# Download only\x1b[0m\n   \
                  dumpmirror service                     \x1b[90m# Run on the configured schedule\x1b[0m\n   \
                  dumpmirror status --json               \x1b[90m# Machine-readable status\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, short = 'c', global = true, env = "DUMPMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one synchronization cycle
    Sync(SyncArgs),

    /// Run synchronization on the configured schedule
    Service,

    /// Show mirror status
    Status(StatusArgs),

    /// Write the default configuration file
    Init(InitArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
