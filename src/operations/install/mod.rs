//! Install operation
//!
//! Resolves a package reference, asks before overwriting an installed
//! version, then places the package: either by its `files` list, or by
//! moving the whole unpacked tree into the package directory.

mod source;
mod stage;


use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cache::PackageDirs;
use crate::common::fs::{dir_size, move_path};
use crate::config::manifest::{MLHUB_YAML, find_in_dir};
use crate::config::Manifest;
use crate::error::{MlhubError, Result};
use crate::git::RepoCloner;
use crate::installer::{FileInstaller, InstallMode};
use crate::net::Fetch;
use crate::temp;
use crate::ui::{Console, NextStep, Prompt};
use crate::version_gate::{GateDecision, confirm_overwrite};

pub use source::PackageSource;
use stage::{ManifestOrigin, Staged};

/// Version assumed for an installed package whose manifest cannot be read
const UNKNOWN_VERSION: &str = "0";

/// What `ml install` ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed {
        name: String,
        version: String,
        path: PathBuf,
        size: u64,
    },
    /// The user kept the installed version
    Declined { name: String },
}

/// High-level install operation
pub struct InstallOperation<'a> {
    home: &'a Path,
    fetch: &'a dyn Fetch,
    cloner: &'a dyn RepoCloner,
    prompt: &'a dyn Prompt,
    identity: Option<&'a Path>,
    console: Console,
}

impl<'a> InstallOperation<'a> {
    pub fn new(
        home: &'a Path,
        fetch: &'a dyn Fetch,
        cloner: &'a dyn RepoCloner,
        prompt: &'a dyn Prompt,
        console: Console,
    ) -> Self {
        Self {
            home,
            fetch,
            cloner,
            prompt,
            identity: None,
            console,
        }
    }

    /// SSH key for private repositories
    pub fn with_identity(mut self, identity: Option<&'a Path>) -> Self {
        self.identity = identity;
        self
    }

    pub fn execute(&self, reference: &str) -> Result<InstallOutcome> {
        info!("Installing '{}'", reference);
        let source = PackageSource::classify(reference)?;
        let scratch = temp::scratch_dir()?;

        let candidate = self.identify(&source, scratch.path())?;
        let dirs = PackageDirs::new(self.home, &candidate.name)?;

        let installed = installed_version(&dirs);
        let decision = confirm_overwrite(
            self.prompt,
            &candidate.name,
            &installed,
            &candidate.version,
            &dirs.install,
        )?;
        if decision == GateDecision::Declined {
            self.console
                .next_steps(&[NextStep::Readme, NextStep::Configure], Some(&candidate.name));
            return Ok(InstallOutcome::Declined {
                name: candidate.name,
            });
        }

        let staged = self.stage(candidate, scratch.path())?;
        self.place(&staged, &dirs)?;

        let size = dir_size(&dirs.install);
        self.console.line(&format!(
            "Found '{}' version {}.\n\nInstalled '{}' into '{}/' ({} bytes).",
            staged.name,
            staged.version,
            staged.name,
            dirs.install.display(),
            group_thousands(size)
        ));
        self.console
            .next_steps(&[NextStep::Readme, NextStep::Configure], Some(&staged.name));

        Ok(InstallOutcome::Installed {
            name: staged.name,
            version: staged.version,
            path: dirs.install,
            size,
        })
    }

    /// Lay the staged package out in its install directory
    fn place(&self, staged: &Staged, dirs: &PackageDirs) -> Result<()> {
        let Some(spec) = staged.manifest.file_spec()?.filter(|spec| !spec.is_empty()) else {
            if find_in_dir(&staged.tree).is_err() {
                write_manifest(&staged.origin, &staged.tree)?;
            }
            return move_path(&staged.tree, &dirs.install).map_err(|e| write_failed(&dirs.install, &e));
        };

        fs::create_dir_all(&dirs.install).map_err(|e| write_failed(&dirs.install, &e))?;
        write_manifest(&staged.origin, &dirs.install)?;

        FileInstaller::new(dirs, self.fetch, self.cloner, self.console)
            .with_identity(self.identity)
            .install(
                &spec,
                InstallMode::Installation {
                    staged: &staged.tree,
                },
            )?;
        Ok(())
    }
}

/// Version of the installed package, if there is one
fn installed_version(dirs: &PackageDirs) -> String {
    if !dirs.is_installed() {
        return UNKNOWN_VERSION.to_string();
    }
    match Manifest::load_from_dir(&dirs.install) {
        Ok(manifest) => manifest.meta.version,
        Err(err) => {
            warn!("Cannot read the installed manifest of '{}': {}", dirs.name, err);
            UNKNOWN_VERSION.to_string()
        }
    }
}

/// Put the manifest at the root of `dir`, keeping its file name
fn write_manifest(origin: &ManifestOrigin, dir: &Path) -> Result<()> {
    match origin {
        ManifestOrigin::Remote(bytes) => {
            let dest = dir.join(MLHUB_YAML);
            fs::write(&dest, bytes).map_err(|e| write_failed(&dest, &e))
        }
        ManifestOrigin::File(path) => {
            let name = path.file_name().map_or_else(|| MLHUB_YAML.into(), ToOwned::to_owned);
            let dest = dir.join(name);
            if dest != *path {
                fs::copy(path, &dest).map_err(|e| write_failed(&dest, &e))?;
            }
            Ok(())
        }
    }
}

fn write_failed(path: &Path, err: &std::io::Error) -> MlhubError {
    MlhubError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// `1234567` -> `1,234,567`
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
