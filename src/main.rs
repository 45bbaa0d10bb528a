//! MLHub - machine learning model package manager
//!
//! Installs model packages from archives, URLs and source hosting services
//! into a local home directory, caching what they download.

use clap::Parser;

mod archive;
mod cache;
mod cli;
mod commands;
mod common;
mod config;
mod deps;
mod error;
mod git;
mod installer;
mod location;
mod net;
mod operations;
mod progress;
mod temp;
mod ui;
mod version_gate;

use cli::{Cli, Commands};
use commands::Globals;

/// Log filter from `MLHUB_LOG`, else `debug` with `--verbose`, else `warn`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("MLHUB_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let globals = Globals {
        init_dir: cli.init_dir.as_deref(),
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(globals, args),
        Commands::Configure(args) => commands::configure::run(globals, args),
        Commands::Remove(args) => commands::remove::run(globals, args),
        Commands::Installed => commands::installed::run(globals),
        Commands::Version(args) => commands::version::run(globals, args),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
