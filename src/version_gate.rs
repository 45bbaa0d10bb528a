//! Confirmation before installing over an existing package
//!
//! Versions are dotted numbers compared component by component, the
//! shorter one padded with zeros, so `1.10.0` is newer than `1.2.0` and
//! `1.2` equals `1.2.0`. Anything else in a component is rejected rather
//! than guessed at.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::common::fs::remove_file_or_dir;
use crate::error::{MlhubError, Result};
use crate::ui::Prompt;

/// A parsed dotted-numeric version
#[derive(Debug, Clone)]
pub struct PackageVersion {
    raw: String,
    parts: Vec<u64>,
}

impl PackageVersion {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| MlhubError::InvalidVersion {
            version: raw.to_string(),
            reason: reason.to_string(),
        };
        if trimmed.is_empty() {
            return Err(invalid("empty version"));
        }
        let parts = trimmed
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid(&format!("component '{part}' is not a number")));
                }
                part.parse::<u64>()
                    .map_err(|_| invalid(&format!("component '{part}' is too large")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            raw: trimmed.to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for PackageVersion {
    type Err = MlhubError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| {
                let a = self.parts.get(i).copied().unwrap_or(0);
                let b = other.parts.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

/// What installing the candidate does to the installed package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChange {
    Upgrade,
    Replace,
    Downgrade,
}

impl VersionChange {
    pub fn question(self, name: &str, installed: &PackageVersion, candidate: &PackageVersion) -> String {
        match self {
            VersionChange::Downgrade => {
                format!("Downgrade '{name}' from version '{installed}' to version '{candidate}'")
            }
            VersionChange::Replace => {
                format!("Replace '{name}' version '{installed}' with version '{candidate}'")
            }
            VersionChange::Upgrade => {
                format!("Upgrade '{name}' from version '{installed}' to version '{candidate}'")
            }
        }
    }
}

pub fn classify(installed: &PackageVersion, candidate: &PackageVersion) -> VersionChange {
    match candidate.cmp(installed) {
        Ordering::Greater => VersionChange::Upgrade,
        Ordering::Equal => VersionChange::Replace,
        Ordering::Less => VersionChange::Downgrade,
    }
}

/// Outcome of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Nothing was installed, or the old install directory is gone now
    Proceed,
    /// The user kept the installed package; nothing was touched
    Declined,
}

/// Ask before overwriting an installed package and, once agreed, remove
/// its install directory. Cache and archive directories are left alone.
pub fn confirm_overwrite(
    prompt: &dyn Prompt,
    name: &str,
    installed: &str,
    candidate: &str,
    install_dir: &Path,
) -> Result<GateDecision> {
    if !install_dir.exists() {
        return Ok(GateDecision::Proceed);
    }

    let installed = PackageVersion::parse(installed)?;
    let candidate = PackageVersion::parse(candidate)?;
    let change = classify(&installed, &candidate);
    debug!("{} {} -> {}: {:?}", name, installed, candidate, change);

    if !prompt.confirm(&change.question(name, &installed, &candidate), true)? {
        return Ok(GateDecision::Declined);
    }

    remove_file_or_dir(install_dir)?;
    Ok(GateDecision::Proceed)
}
