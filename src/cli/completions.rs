use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    ml completions bash > ~/.bash_completion.d/ml\n\n\
                  Generate zsh completions:\n    ml completions zsh > ~/.zfunc/_ml\n\n\
                  Generate fish completions:\n    ml completions fish > ~/.config/fish/completions/ml.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
