use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    dumpmirror completions bash > ~/.bash_completion.d/dumpmirror\n\n\
                  Generate zsh completions:\n    dumpmirror completions zsh > ~/.zfunc/_dumpmirror\n\n\
                  Generate fish completions:\n    dumpmirror completions fish > ~/.config/fish/completions/dumpmirror.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
