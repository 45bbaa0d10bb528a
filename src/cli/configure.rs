use clap::Parser;
use std::path::PathBuf;

/// Arguments for the configure command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Fetch data files and list dependencies:\n    ml configure rain\n\n\
                   Use a deploy key for files in a private repository:\n    ml configure rain -i ~/.ssh/deploy_key")]
pub struct ConfigureArgs {
    /// Name of the installed package
    pub name: String,

    /// SSH private key for cloning private repositories
    #[arg(long, short = 'i', value_name = "KEY")]
    pub identity: Option<PathBuf>,
}
