//! [`RepoCloner`] for tests: writes a fixed tree where the clone would go

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use super::RepoCloner;
use crate::error::Result;

#[derive(Default)]
pub struct FakeCloner {
    files: Vec<(&'static str, &'static str)>,
    calls: RefCell<Vec<(String, String)>>,
}

impl FakeCloner {
    pub fn with_files(files: &[(&'static str, &'static str)]) -> Self {
        Self {
            files: files.to_vec(),
            ..Self::default()
        }
    }

    /// `(url, ref)` of every clone requested so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }
}

impl RepoCloner for FakeCloner {
    fn clone_at_ref(
        &self,
        url: &str,
        git_ref: &str,
        dest: &Path,
        _identity: Option<&Path>,
    ) -> Result<PathBuf> {
        self.calls
            .borrow_mut()
            .push((url.to_string(), git_ref.to_string()));
        for (rel, body) in &self.files {
            let path = dest.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, body)?;
        }
        fs::create_dir_all(dest.join(".git"))?;
        Ok(dest.to_path_buf())
    }
}
