//! Package and dependency archives
//!
//! The archive type is decided by file name, never by content:
//! `.zip`, `.mlm` and `.aipk` are zip files; `.tar`, `.tar.gz`, `.tgz` and
//! `.gz` are tarballs. `.bz2` names are recognised as archives but cannot be
//! unpacked.

mod extract;

pub use extract::unpack_with_promote;

use crate::error::{MlhubError, Result};

/// Extension of model package archives
pub const EXT_MLM: &str = ".mlm";
/// Extension of legacy model package archives
pub const EXT_AIPK: &str = ".aipk";

/// Archive families we can unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveFormat {
    /// Format for a file name, or `UnsupportedArchive`
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.to_lowercase();
        if ends_with_mlm(&lower) || lower.ends_with(".zip") {
            Ok(ArchiveFormat::Zip)
        } else if lower.ends_with(".tar") {
            Ok(ArchiveFormat::Tar)
        } else if lower.ends_with(".tgz") || lower.ends_with(".gz") {
            Ok(ArchiveFormat::TarGz)
        } else {
            Err(MlhubError::UnsupportedArchive {
                name: name.to_string(),
            })
        }
    }
}

/// Whether `name` is a `.mlm` or `.aipk` package archive
pub fn ends_with_mlm(name: &str) -> bool {
    name.ends_with(EXT_MLM) || name.ends_with(EXT_AIPK)
}

/// Whether `name` looks like any archive we recognise
pub fn is_archive_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    ends_with_mlm(&lower)
        || [".zip", ".tar", ".gz", ".tgz", ".bz2"]
            .iter()
            .any(|ext| lower.ends_with(ext))
}

/// Strip a trailing archive extension (`v1.0.tar.gz` -> `v1.0`)
pub fn drop_archive_ext(name: &str) -> &str {
    for ext in [".tar.gz", ".tar.bz2", ".zip", ".tar", ".tgz", ".gz", ".bz2"] {
        if let Some(stem) = name.strip_suffix(ext) {
            return stem;
        }
    }
    name
}

/// Split `<name>_<version>.mlm` into name and version
pub fn interpret_mlm_name(file_name: &str) -> Result<(String, String)> {
    let malformed = || MlhubError::MalformedPackageFileName {
        name: file_name.to_string(),
    };

    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = base
        .strip_suffix(EXT_MLM)
        .or_else(|| base.strip_suffix(EXT_AIPK))
        .ok_or_else(malformed)?;
    let (name, version) = stem.split_once('_').ok_or_else(malformed)?;

    if name.is_empty() || version.is_empty() || version.contains('_') {
        return Err(malformed());
    }
    Ok((name.to_string(), version.to_string()))
}
