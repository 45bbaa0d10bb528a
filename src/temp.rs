//! Scratch directories for downloads, extraction and clones
//!
//! Scratch space is never created under the current working directory, even
//! when TMPDIR is relative (e.g. TMPDIR=tmp).

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::{MlhubError, Result};

/// Returns an absolute directory suitable for creating temporary directories.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Create a fresh scratch directory, removed when the handle is dropped
pub fn scratch_dir() -> Result<TempDir> {
    let base = temp_dir_base();
    tempfile::Builder::new()
        .prefix("mlhub")
        .tempdir_in(&base)
        .map_err(|e| MlhubError::FileWriteFailed {
            path: base.display().to_string(),
            reason: format!("cannot create scratch directory: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_base_is_absolute() {
        assert!(temp_dir_base().is_absolute());
    }

    #[test]
    fn test_scratch_dir_is_removed_on_drop() {
        let dir = scratch_dir().unwrap();
        let path = dir.path().to_path_buf();
        assert!(path.is_dir());
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("mlhub")
        );
        drop(dir);
        assert!(!path.exists());
    }
}
