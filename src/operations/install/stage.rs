//! Identifying and unpacking a package ahead of placing it
//!
//! Identification finds the package name and version as cheaply as the
//! source allows: from a `<name>_<version>.mlm` file name, or from a
//! manifest read straight off the hosting service. Only plain archives have
//! to be unpacked before the version gate can run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::InstallOperation;
use super::source::PackageSource;
use crate::archive::{ArchiveFormat, ends_with_mlm, interpret_mlm_name, is_archive_file, unpack_with_promote};
use crate::common::fs::remove_file_or_dir;
use crate::config::manifest::find_in_dir;
use crate::config::Manifest;
use crate::error::{MlhubError, Result};
use crate::location::{Location, read_raw_file};
use crate::net::url_basename;

/// Directory under the scratch space the package is unpacked into
const UNPACKED: &str = "package";

/// Where the package archive comes from
#[derive(Debug, Clone)]
pub(super) enum Archive {
    Local(PathBuf),
    Remote(String),
}

/// Where the manifest was read from
#[derive(Debug, Clone)]
pub(super) enum ManifestOrigin {
    /// A file inside the unpacked or cloned tree
    File(PathBuf),
    /// Bytes fetched from a hosting service
    Remote(Vec<u8>),
}

/// A package whose name and version are known
#[derive(Debug)]
pub(super) struct Candidate {
    pub name: String,
    pub version: String,
    /// Archive still to be unpacked, with the name deciding its type
    pub archive: Option<(Archive, String)>,
    /// Unpacked or cloned package tree
    pub tree: Option<PathBuf>,
    pub manifest: Option<(Manifest, ManifestOrigin)>,
}

/// A package ready to be placed
#[derive(Debug)]
pub(super) struct Staged {
    pub name: String,
    pub version: String,
    pub tree: PathBuf,
    pub manifest: Manifest,
    pub origin: ManifestOrigin,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn load_manifest(path: PathBuf) -> Result<(Manifest, ManifestOrigin)> {
    let manifest = Manifest::load(&path)?;
    Ok((manifest, ManifestOrigin::File(path)))
}

impl InstallOperation<'_> {
    pub(super) fn identify(&self, source: &PackageSource, scratch: &Path) -> Result<Candidate> {
        match source {
            PackageSource::LocalArchive(path) => {
                if !path.is_file() {
                    return Err(MlhubError::FileReadFailed {
                        path: path.display().to_string(),
                        reason: "no such package archive".to_string(),
                    });
                }
                self.identify_archive(Archive::Local(path.clone()), file_name(path), scratch)
            }
            PackageSource::ArchiveUrl(url) => {
                let name = self.archive_name(url)?;
                self.identify_archive(Archive::Remote(url.clone()), name, scratch)
            }
            PackageSource::Hosted(loc) => self.identify_hosted(loc, scratch),
        }
    }

    /// Name for a downloaded package: the URL's last segment, else the
    /// server's suggestion, as long as it names an archive
    fn archive_name(&self, url: &str) -> Result<String> {
        let base = url_basename(url);
        if is_archive_file(&base) {
            return Ok(base);
        }
        match self.fetch.suggested_filename(url)? {
            Some(name) if is_archive_file(&name) => Ok(name),
            Some(name) => Err(MlhubError::UnsupportedArchive { name }),
            None => Err(MlhubError::UnsupportedArchive { name: url.to_string() }),
        }
    }

    fn identify_archive(&self, archive: Archive, name: String, scratch: &Path) -> Result<Candidate> {
        ArchiveFormat::from_name(&name)?;

        if ends_with_mlm(&name) {
            let (pkg, version) = interpret_mlm_name(&name)?;
            debug!("'{}' is '{}' version {}", name, pkg, version);
            return Ok(Candidate {
                name: pkg,
                version,
                archive: Some((archive, name)),
                tree: None,
                manifest: None,
            });
        }

        let tree = self.unpack(&archive, &name, scratch)?;
        let manifest = load_manifest(find_in_dir(&tree)?)?;
        Ok(Candidate {
            name: manifest.0.meta.name.clone(),
            version: manifest.0.meta.version.clone(),
            archive: None,
            tree: Some(tree),
            manifest: Some(manifest),
        })
    }

    fn identify_hosted(&self, loc: &Location, scratch: &Path) -> Result<Candidate> {
        let remote = loc.get_pkg_yaml_url(self.fetch).and_then(|url| {
            let bytes = read_raw_file(self.fetch, &url)?;
            Ok((url, bytes))
        });

        let (url, bytes) = match remote {
            Ok(found) => found,
            Err(MlhubError::ManifestNotFound { .. } | MlhubError::DependencyFileNotFound { .. }) => {
                debug!("No manifest visible for '{}', may be private", loc.reference);
                return self.identify_private(loc, scratch);
            }
            Err(err) => return Err(err),
        };

        let manifest = Manifest::from_bytes(&bytes, &url)?;
        let archive_name = format!("{}-{}.zip", loc.repo, loc.git_ref.replace('/', "-"));
        Ok(Candidate {
            name: manifest.meta.name.clone(),
            version: manifest.meta.version.clone(),
            archive: Some((Archive::Remote(loc.compose_repo_zip_url()), archive_name)),
            tree: None,
            manifest: Some((manifest, ManifestOrigin::Remote(bytes))),
        })
    }

    /// Clone over SSH; the manifest is the reference's path, or found at the root
    fn identify_private(&self, loc: &Location, scratch: &Path) -> Result<Candidate> {
        let url = loc.ssh_clone_url();
        self.console
            .line(&format!("Cloning {url} at '{}' ...", loc.git_ref));

        let tree = self
            .cloner
            .clone_at_ref(&url, &loc.git_ref, &scratch.join(&loc.repo), self.identity)?;
        remove_file_or_dir(&tree.join(".git"))?;

        let manifest_path = match loc.path.as_deref() {
            Some(path) => tree.join(path),
            None => find_in_dir(&tree)?,
        };
        if !manifest_path.is_file() {
            return Err(MlhubError::ManifestNotFound {
                location: loc.reference.clone(),
            });
        }

        let manifest = load_manifest(manifest_path)?;
        Ok(Candidate {
            name: manifest.0.meta.name.clone(),
            version: manifest.0.meta.version.clone(),
            archive: None,
            tree: Some(tree),
            manifest: Some(manifest),
        })
    }

    /// Download if needed, then unpack into the scratch space
    fn unpack(&self, archive: &Archive, name: &str, scratch: &Path) -> Result<PathBuf> {
        let local = match archive {
            Archive::Local(path) => path.clone(),
            Archive::Remote(url) => {
                let dest = scratch.join(name);
                self.console.downloading(url, &dest);
                self.fetch.download(url, &dest)?;
                dest
            }
        };

        let tree = scratch.join(UNPACKED);
        self.console.extracting(&local, &tree);
        unpack_with_promote(&local, &tree, Some(name), true)?;
        Ok(tree)
    }

    /// Unpack what identification left packed and make sure a manifest is at hand
    pub(super) fn stage(&self, candidate: Candidate, scratch: &Path) -> Result<Staged> {
        let tree = match (candidate.tree, &candidate.archive) {
            (Some(tree), _) => tree,
            (None, Some((archive, name))) => self.unpack(archive, name, scratch)?,
            (None, None) => {
                return Err(MlhubError::ManifestNotFound {
                    location: candidate.name,
                });
            }
        };
        fs::create_dir_all(&tree)?;

        let (manifest, origin) = match candidate.manifest {
            Some(found) => found,
            None => load_manifest(find_in_dir(&tree)?)?,
        };

        Ok(Staged {
            name: candidate.name,
            version: candidate.version,
            tree,
            manifest,
            origin,
        })
    }
}
