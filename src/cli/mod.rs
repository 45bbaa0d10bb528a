//! CLI definitions using clap derive API
//!
//! One submodule per command's arguments:
//! - install: Install command arguments
//! - configure: Configure command arguments
//! - remove: Remove command arguments
//! - version: Version command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod configure;
pub mod install;
pub mod remove;
pub mod version;

pub use completions::CompletionsArgs;
pub use configure::ConfigureArgs;
pub use install::InstallArgs;
pub use remove::RemoveArgs;
pub use version::VersionArgs;

/// MLHub - machine learning model packages
///
/// Install, configure and remove model packages from archives and source hosting services.
#[derive(Parser, Debug)]
#[command(
    name = "ml",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Install and configure machine learning model packages",
    long_about = "MLHub installs model packages from .mlm/.zip/.tar.gz archives, URLs and \
                  GitHub, GitLab or Bitbucket repositories into ~/.mlhub, caching the files \
                  they download.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  ml install audit_1.2.0.mlm             \x1b[90m# Install a packaged model\x1b[0m\n   \
                  ml install acme/rain@v2                \x1b[90m# Install from a GitHub ref\x1b[0m\n   \
                  ml install gitlab:acme/rain             \x1b[90m# Install from GitLab\x1b[0m\n   \
                  ml configure rain                      \x1b[90m# Fetch data files, list dependencies\x1b[0m\n   \
                  ml installed                           \x1b[90m# List installed packages\x1b[0m\n   \
                  ml remove rain                         \x1b[90m# Remove a package\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// MLHub home directory (defaults to ~/.mlhub)
    #[arg(long = "init-dir", global = true, env = "MLINIT", value_name = "DIR")]
    pub init_dir: Option<PathBuf>,

    /// Print only errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a model package
    Install(InstallArgs),

    /// Fetch a package's remote files and report its dependencies
    Configure(ConfigureArgs),

    /// Remove an installed package
    #[command(alias = "uninstall")]
    Remove(RemoveArgs),

    /// List installed packages
    Installed,

    /// Show version information
    Version(VersionArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
