use clap::Parser;

/// Arguments for the version command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Show the MLHub version:\n    ml version\n\n\
                   Show an installed package's version:\n    ml version rain")]
pub struct VersionArgs {
    /// Installed package to report instead of MLHub itself
    pub package: Option<String>,
}
