use clap::Parser;

/// Arguments for the sync command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Run one cycle with the default configuration:\n    dumpmirror sync\n\n\
                  Download without unpacking:\n    dumpmirror sync --no-unpack\n\n\
                  Use a specific configuration file:\n    dumpmirror sync -c /etc/dumpmirror.yaml")]
pub struct SyncArgs {
    /// Skip decompression for this run
    #[arg(long)]
    pub no_unpack: bool,
}
