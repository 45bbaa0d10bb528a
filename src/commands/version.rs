//! Version command implementation

use std::path::Path;

use crate::cache::PackageDirs;
use crate::cli::VersionArgs;
use crate::commands::Globals;
use crate::config::{Manifest, Settings};
use crate::error::{MlhubError, Result};

/// Run version command
pub fn run(globals: Globals<'_>, args: VersionArgs) -> Result<()> {
    let Some(name) = args.package else {
        println!("ml {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Build info:");
        println!("  Rust version: {}", rustc_version());
        println!("  Profile: {}", build_profile());
        return Ok(());
    };

    let settings = Settings::load(globals.init_dir, None)?;
    println!("{} {}", name, package_version(&settings.home, &name)?);
    Ok(())
}

/// Version recorded in an installed package's manifest
fn package_version(home: &Path, name: &str) -> Result<String> {
    let dirs = PackageDirs::new(home, name)?;
    if !dirs.is_installed() {
        return Err(MlhubError::PackageNotInstalled {
            name: name.to_string(),
        });
    }
    Ok(Manifest::load_from_dir(&dirs.install)?.meta.version)
}

fn rustc_version() -> &'static str {
    env!("CARGO_PKG_RUST_VERSION")
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
