//! Shell completions command

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::CompletionsArgs;
use crate::error::{MirrorError, Result};

/// Generate shell completions
pub fn run(args: CompletionsArgs) -> Result<()> {
    generate(&args.shell, &mut std::io::stdout().lock())
}

fn parse_shell(name: &str) -> Result<Shell> {
    match name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "elvish" => Ok(Shell::Elvish),
        "fish" => Ok(Shell::Fish),
        "powershell" | "pwsh" => Ok(Shell::PowerShell),
        "zsh" => Ok(Shell::Zsh),
        _ => Err(MirrorError::UnsupportedShell {
            shell: name.to_string(),
        }),
    }
}

fn generate(shell_name: &str, out: &mut impl Write) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    let mut cmd = <crate::cli::Cli as CommandFactory>::command();
    clap_complete::generate(shell, &mut cmd, "dumpmirror", out);
    Ok(())
}
