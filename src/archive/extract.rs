use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;
use walkdir::WalkDir;

use super::ArchiveFormat;
use crate::common::fs::{remove_file_or_dir, to_slash};
use crate::error::{MlhubError, Result};
use crate::temp;

/// Outcome of [`unpack_with_promote`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpacked {
    /// Whether a shared top-level directory was stripped
    pub promoted: bool,
    /// The stripped directory name
    pub top_dir: Option<String>,
    /// Relative paths of the regular files written under the destination
    pub files: Vec<String>,
}

struct Entry {
    name: String,
    is_dir: bool,
}

fn archive_error(path: &Path, reason: impl std::fmt::Display) -> MlhubError {
    MlhubError::ArchiveFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn normalize_entry_name(raw: &str) -> String {
    let mut name = raw.replace('\\', "/");
    while let Some(rest) = name.strip_prefix("./") {
        name = rest.to_string();
    }
    name
}

fn list_entries(file: &Path, format: ArchiveFormat) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    match format {
        ArchiveFormat::Zip => {
            let mut archive = zip::ZipArchive::new(File::open(file)?)
                .map_err(|e| archive_error(file, e))?;
            for i in 0..archive.len() {
                let entry = archive.by_index(i).map_err(|e| archive_error(file, e))?;
                entries.push(Entry {
                    name: normalize_entry_name(entry.name()),
                    is_dir: entry.is_dir(),
                });
            }
        }
        ArchiveFormat::Tar | ArchiveFormat::TarGz => {
            let reader = open_tar(file, format)?;
            let mut archive = tar::Archive::new(reader);
            for entry in archive.entries().map_err(|e| archive_error(file, e))? {
                let entry = entry.map_err(|e| archive_error(file, e))?;
                let path = entry.path().map_err(|e| archive_error(file, e))?;
                entries.push(Entry {
                    name: normalize_entry_name(&path.to_string_lossy()),
                    is_dir: entry.header().entry_type().is_dir(),
                });
            }
        }
    }
    entries.retain(|e| !e.name.is_empty() && e.name != ".");
    Ok(entries)
}

fn open_tar(file: &Path, format: ArchiveFormat) -> Result<Box<dyn io::Read>> {
    let handle = File::open(file).map_err(|e| archive_error(file, e))?;
    Ok(match format {
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(handle)),
        ArchiveFormat::Tar | ArchiveFormat::Zip => Box::new(handle),
    })
}

fn extract_zip(file: &Path, dest: &Path) -> Result<()> {
    let mut archive =
        zip::ZipArchive::new(File::open(file)?).map_err(|e| archive_error(file, e))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| archive_error(file, e))?;
        // Entries escaping the destination are skipped
        let Some(relative) = entry.enclosed_name() else {
            debug!("Skipping unsafe zip entry {}", entry.name());
            continue;
        };
        let entry_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&entry_path)?;
            continue;
        }
        if let Some(parent) = entry_path.parent() {
            fs::create_dir_all(parent)?;
        }
        remove_file_or_dir(&entry_path)?;
        let mut outfile = File::create(&entry_path)?;
        io::copy(&mut entry, &mut outfile).map_err(|e| archive_error(file, e))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&entry_path, fs::Permissions::from_mode(mode & 0o7777))?;
        }
    }
    Ok(())
}

fn extract_all(file: &Path, format: ArchiveFormat, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    match format {
        ArchiveFormat::Zip => extract_zip(file, dest),
        ArchiveFormat::Tar | ArchiveFormat::TarGz => {
            let mut archive = tar::Archive::new(open_tar(file, format)?);
            archive.set_overwrite(true);
            archive.unpack(dest).map_err(|e| archive_error(file, e))
        }
    }
}

/// Pack every file below `root` into a plain tarball, named relative to `root`
fn repack(root: &Path, out: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let mut builder = tar::Builder::new(File::create(out)?);
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| archive_error(root, e))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        builder
            .append_path_with_name(entry.path(), relative)
            .map_err(|e| archive_error(out, e))?;
        files.push(to_slash(relative));
    }
    builder.finish().map_err(|e| archive_error(out, e))?;
    Ok(files)
}

fn shared_top_dir(entries: &[Entry]) -> Option<String> {
    let first_segment = |name: &str| name.split('/').next().unwrap_or_default().to_string();
    let first = first_segment(&entries.first()?.name);

    let wrapped = if entries.len() == 1 {
        entries[0].name.trim_end_matches('/').contains('/') || entries[0].is_dir
    } else {
        entries.iter().all(|e| first_segment(&e.name) == first)
    };
    wrapped.then_some(first)
}

/// Unpack `file` into `dest`, stripping a top-level directory shared by
/// every entry.
///
/// The archive type is taken from `valid_name` when given (downloads often
/// live under names without an extension), otherwise from `file`. With
/// `remove_dst` the destination is deleted first; without it the extracted
/// files are merged over whatever `dest` already holds.
pub fn unpack_with_promote(
    file: &Path,
    dest: &Path,
    valid_name: Option<&str>,
    remove_dst: bool,
) -> Result<Unpacked> {
    let name = valid_name.map_or_else(|| file.to_string_lossy().to_string(), str::to_string);
    let format = ArchiveFormat::from_name(&name)?;

    if remove_dst {
        remove_file_or_dir(dest)?;
    }

    let entries = list_entries(file, format)?;
    if entries.is_empty() {
        return Err(archive_error(file, "archive is empty"));
    }

    let Some(top_dir) = shared_top_dir(&entries) else {
        debug!("Extract {} directly into {}", file.display(), dest.display());
        extract_all(file, format, dest)?;
        let files = entries
            .into_iter()
            .filter(|e| !e.is_dir && !e.name.ends_with('/'))
            .map(|e| e.name)
            .collect();
        return Ok(Unpacked {
            promoted: false,
            top_dir: None,
            files,
        });
    };

    debug!(
        "Extract {} without top dir '{}' into {}",
        file.display(),
        top_dir,
        dest.display()
    );
    let scratch = temp::scratch_dir()?;
    let staged: PathBuf = scratch.path().join("extracted");
    extract_all(file, format, &staged)?;

    let repacked = scratch.path().join("repacked.tar");
    let files = repack(&staged.join(&top_dir), &repacked)?;
    extract_all(&repacked, ArchiveFormat::Tar, dest)?;

    Ok(Unpacked {
        promoted: true,
        top_dir: Some(top_dir),
        files,
    })
}
