use std::fs;
use std::path::{Path, PathBuf};

use crate::common::fs::join_slash;
use crate::error::{MlhubError, Result};

/// Extracted dependency content, relative to the home directory
pub const CACHE_DIR: &str = ".cache";

/// Raw downloads, relative to the home directory
pub const ARCHIVE_DIR: &str = ".archive";

/// Per-package configuration, relative to the home directory
pub const CONFIG_DIR: &str = ".config";

/// A normalized destination inside a package directory.
///
/// A directory target ends with `/` in its textual form; files go inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    rel: String,
    is_dir: bool,
}

impl Target {
    /// Normalize a relative target, rejecting paths that leave the package
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts: Vec<&str> = Vec::new();
        for segment in raw.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    if parts.pop().is_none() {
                        return Err(MlhubError::ManifestMalformed {
                            location: raw.to_string(),
                            reason: "target escapes the package directory".to_string(),
                        });
                    }
                }
                other => parts.push(other),
            }
        }
        let rel = parts.join("/");
        let is_dir = rel.is_empty() || raw.ends_with('/') || raw.ends_with('\\');
        Ok(Self { rel, is_dir })
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Path without the trailing separator
    pub fn rel(&self) -> &str {
        &self.rel
    }

    /// Resolve against a base directory
    pub fn under(&self, base: &Path) -> PathBuf {
        join_slash(base, &self.rel)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_dir && !self.rel.is_empty() {
            write!(f, "{}/", self.rel)
        } else {
            write!(f, "{}", self.rel)
        }
    }
}

/// Install, cache, archive and config directories of one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDirs {
    pub name: String,
    pub install: PathBuf,
    pub cache: PathBuf,
    pub archive: PathBuf,
    pub config: PathBuf,
}

/// A name that stays one directory below the home and clear of the
/// hidden `.cache`, `.archive` and `.config` trees
fn check_package_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && Path::new(name).components().count() == 1;
    if valid {
        Ok(())
    } else {
        Err(MlhubError::InvalidPackageName {
            name: name.to_string(),
        })
    }
}

impl PackageDirs {
    pub fn new(home: &Path, name: &str) -> Result<Self> {
        check_package_name(name)?;
        Ok(Self {
            name: name.to_string(),
            install: home.join(name),
            cache: home.join(CACHE_DIR).join(name),
            archive: home.join(ARCHIVE_DIR).join(name),
            config: home.join(CONFIG_DIR).join(name),
        })
    }

    pub fn is_installed(&self) -> bool {
        self.install.is_dir()
    }

    /// Where `target` is published in the installed package
    pub fn install_path(&self, target: &Target) -> PathBuf {
        target.under(&self.install)
    }

    /// Where the content for `target` lives once ready to use
    pub fn cache_path(&self, target: &Target) -> PathBuf {
        target.under(&self.cache)
    }

    /// Where the raw download for `target` is kept when it must be unpacked
    pub fn archive_path(&self, target: &Target, filename: &str) -> PathBuf {
        target.under(&self.archive).join(filename)
    }

    pub fn ensure_cache_dirs(&self) -> Result<()> {
        for dir in [&self.cache, &self.archive] {
            fs::create_dir_all(dir).map_err(|e| MlhubError::FileWriteFailed {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Names of installed packages: non-hidden directories of the home directory
pub fn list_installed(home: &Path) -> Result<Vec<String>> {
    if !home.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(home)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with('.') && entry.path().is_dir() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
