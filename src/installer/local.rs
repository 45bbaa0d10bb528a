//! Entries placed by moving files: paths inside the package archive and
//! clones of private repositories

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{FileInstaller, ItemOutcome};
use crate::cache::Target;
use crate::common::fs::{join_slash, merge_folder, move_path, path_exists, remove_file_or_dir};
use crate::error::{MlhubError, Result};
use crate::location::Location;
use crate::temp;

fn write_failed(path: &Path, err: &std::io::Error) -> MlhubError {
    MlhubError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

impl FileInstaller<'_> {
    /// Move `source` from the unpacked archive at `staged` into the package.
    ///
    /// `dir/*` merges everything under `dir` into the target.
    pub(super) fn install_local(
        &self,
        source: &str,
        target: Option<&str>,
        staged: &Path,
    ) -> Result<Vec<PathBuf>> {
        let missing = || MlhubError::PackageFileMissing {
            location: source.to_string(),
        };
        let goal = Target::parse(target.unwrap_or_default())?;

        if let Some(dir) = source.strip_suffix('*') {
            let origin = Target::parse(dir)?.under(staged);
            if !origin.is_dir() {
                return Err(missing());
            }
            let goal_path = self.dirs.install_path(&goal);
            self.console.moving(source, &goal_path);
            let moved = merge_folder(&origin, &goal_path).map_err(|e| write_failed(&goal_path, &e))?;
            return Ok(moved.iter().map(|rel| join_slash(&goal_path, rel)).collect());
        }

        let origin = Target::parse(source)?.under(staged);
        if !path_exists(&origin) {
            return Err(missing());
        }
        self.console.moving(source, &self.dirs.install_path(&goal));
        self.place(&origin, &goal)
    }

    /// Clone the repository over SSH and place the referenced path as if it
    /// had come with the package
    pub(super) fn install_private(&self, loc: &Location, target: Option<&str>) -> Result<ItemOutcome> {
        let url = loc.ssh_clone_url();
        self.console.line(&format!("      cloning {url} at '{}' ...", loc.git_ref));

        let scratch = temp::scratch_dir()?;
        let tree = self
            .cloner
            .clone_at_ref(&url, &loc.git_ref, &scratch.path().join(&loc.repo), self.identity)?;
        remove_file_or_dir(&tree.join(".git"))?;

        let origin = match loc.path.as_deref() {
            Some(path) => Target::parse(path)?.under(&tree),
            None => tree,
        };
        if !path_exists(&origin) {
            warn!("'{}' is not in the cloned repository", loc.reference);
            return Ok(self.not_found(&loc.reference));
        }

        let goal = Target::parse(target.unwrap_or_default())?;
        self.place(&origin, &goal).map(ItemOutcome::Installed)
    }

    /// A directory merges into a target named without a trailing `/`;
    /// anything else moves into a directory target or onto a file target.
    fn place(&self, origin: &Path, goal: &Target) -> Result<Vec<PathBuf>> {
        let goal_path = self.dirs.install_path(goal);

        if origin.is_dir() && !goal.is_dir() {
            debug!("Merging {} into {}", origin.display(), goal_path.display());
            let moved = merge_folder(origin, &goal_path).map_err(|e| write_failed(&goal_path, &e))?;
            return Ok(moved.iter().map(|rel| join_slash(&goal_path, rel)).collect());
        }

        let dest = match (goal.is_dir(), origin.file_name()) {
            (true, Some(name)) => goal_path.join(name),
            _ => goal_path,
        };
        debug!("Moving {} to {}", origin.display(), dest.display());
        move_path(origin, &dest).map_err(|e| write_failed(&dest, &e))?;
        Ok(vec![dest])
    }
}
