//! Installation of a package's `files` dependencies
//!
//! Three kinds of source appear in a `files` list:
//!
//! - URLs, downloaded into the package cache and symlinked into the
//!   package directory
//! - hosting references (`owner/repo@ref:path`), resolved to a file,
//!   directory or whole repository download, with a `git` clone as the
//!   fallback for repositories the hosting API will not show
//! - paths inside the package archive, moved into place while the
//!   package itself is being installed
//!
//! Remote sources are handled by `ml configure`, local ones by
//! `ml install`; each pass skips the other kind.

mod local;
mod plan;
mod remote;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cache::PackageDirs;
use crate::common::fs::remove_file_or_dir;
use crate::deps::FileSpec;
use crate::error::{MlhubError, Result};
use crate::git::RepoCloner;
use crate::location::{is_repo_ref, is_url};
use crate::net::Fetch;
use crate::ui::Console;

pub use plan::Plan;

/// Which `files` entries a pass handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode<'a> {
    /// Installing the package archive unpacked at `staged`: local paths only
    Installation { staged: &'a Path },
    /// Configuring an installed package: URLs and hosting references only
    Configuration,
}

/// Result of installing one remote entry
enum ItemOutcome {
    Installed(Vec<PathBuf>),
    NotFound,
}

/// Whether a `files` source is fetched rather than taken from the archive
pub fn is_remote(source: &str) -> bool {
    is_url(source) || is_repo_ref(source)
}

/// Installs `files` entries for one package
pub struct FileInstaller<'a> {
    dirs: &'a PackageDirs,
    fetch: &'a dyn Fetch,
    cloner: &'a dyn RepoCloner,
    identity: Option<&'a Path>,
    console: Console,
}

impl<'a> FileInstaller<'a> {
    pub fn new(
        dirs: &'a PackageDirs,
        fetch: &'a dyn Fetch,
        cloner: &'a dyn RepoCloner,
        console: Console,
    ) -> Self {
        Self {
            dirs,
            fetch,
            cloner,
            identity: None,
            console,
        }
    }

    /// SSH key used when a private repository has to be cloned
    pub fn with_identity(mut self, identity: Option<&'a Path>) -> Self {
        self.identity = identity;
        self
    }

    /// Install every entry of `spec` that `mode` handles, returning the
    /// paths created in the package directory.
    ///
    /// Remote entries that cannot be fetched do not stop the others; they
    /// are reported together once the list is done. A local entry missing
    /// from the archive means the package is broken: the package
    /// directory is removed and the error returned at once.
    pub fn install(&self, spec: &FileSpec, mode: InstallMode<'_>) -> Result<Vec<PathBuf>> {
        info!("Installing file dependencies of '{}'", self.dirs.name);

        if mode == InstallMode::Configuration {
            self.dirs.ensure_cache_dirs()?;
            self.console.line("\n*** Downloading required files ...");
        }

        let mut installed = Vec::new();
        let mut missing = Vec::new();

        for entry in spec {
            let target = entry.target.as_deref();
            match (mode, is_remote(&entry.source)) {
                (InstallMode::Configuration, true) => {
                    match self.install_remote(&entry.source, target)? {
                        ItemOutcome::Installed(paths) => installed.extend(paths),
                        ItemOutcome::NotFound => missing.push(entry.source.clone()),
                    }
                }
                (InstallMode::Installation { staged }, false) => {
                    match self.install_local(&entry.source, target, staged) {
                        Ok(paths) => installed.extend(paths),
                        Err(err @ MlhubError::PackageFileMissing { .. }) => {
                            remove_file_or_dir(&self.dirs.install)?;
                            return Err(err);
                        }
                        Err(err) => return Err(err),
                    }
                }
                _ => debug!("Skipping '{}' in this pass", entry.source),
            }
        }

        if !missing.is_empty() {
            return Err(MlhubError::DependencyFileNotFound {
                location: missing.join(", "),
            });
        }
        Ok(installed)
    }
}
