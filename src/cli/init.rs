use clap::Parser;

/// Arguments for the init command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Write the default configuration:\n    dumpmirror init\n\n\
                  Overwrite an existing configuration:\n    dumpmirror init --force")]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}
