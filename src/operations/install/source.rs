//! What an `ml install` reference points at

use std::path::{Path, PathBuf};

use crate::archive::is_archive_file;
use crate::error::{MlhubError, Result};
use crate::location::{Location, is_url};
use crate::net::url_basename;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// A package archive on disk
    LocalArchive(PathBuf),
    /// A package archive behind a URL outside the hosting services
    ArchiveUrl(String),
    /// A repository, or a manifest inside one, on a hosting service
    Hosted(Location),
}

/// Whether `reference` reads as a filesystem path rather than `owner/repo`
fn looks_like_path(reference: &str) -> bool {
    reference.starts_with(['.', '/', '~', '\\']) || Path::new(reference).exists()
}

impl PackageSource {
    /// Classify a reference.
    ///
    /// URLs naming an archive are downloaded as they are, even on a hosting
    /// service; other URLs on a hosting service name a repository.
    pub fn classify(reference: &str) -> Result<Self> {
        let reference = reference.trim();

        if is_url(reference) {
            if is_archive_file(&url_basename(reference)) {
                return Ok(Self::ArchiveUrl(reference.to_string()));
            }
            return Ok(Location::parse(reference)
                .map_or_else(|| Self::ArchiveUrl(reference.to_string()), Self::Hosted));
        }

        if is_archive_file(reference) || looks_like_path(reference) {
            if !is_archive_file(reference) {
                return Err(MlhubError::UnsupportedArchive {
                    name: reference.to_string(),
                });
            }
            return Ok(Self::LocalArchive(PathBuf::from(reference)));
        }

        Location::parse(reference)
            .map(Self::Hosted)
            .ok_or_else(|| MlhubError::UnknownReference {
                reference: reference.to_string(),
            })
    }
}
