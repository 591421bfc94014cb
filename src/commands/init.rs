//! Init command implementation

use std::path::Path;

use crate::cli::InitArgs;
use crate::config::Config;
use crate::error::Result;

/// Write the default configuration to `config_path`
pub fn run(config_path: &Path, args: InitArgs) -> Result<()> {
    Config::write_default(config_path, args.force)?;
    tracing::info!(path = %config_path.display(), "wrote default configuration");
    println!("Wrote default configuration to {}", config_path.display());
    println!("Edit it, then run 'dumpmirror sync' or 'dumpmirror service'.");
    Ok(())
}
