//! URL and hosting-reference entries: download, cache, unpack, symlink

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::{FileInstaller, ItemOutcome, Plan};
use crate::archive::unpack_with_promote;
use crate::cache::Target;
use crate::common::fs::{join_slash, make_symlink, merge_folder};
use crate::error::{MlhubError, Result};
use crate::location::{Location, ResourceKind, is_url};
use crate::net::{FetchError, url_basename};
use crate::temp;

/// Name under which a repository download is archived
pub(super) fn repo_archive_name(loc: &Location) -> String {
    format!(
        "{}-{}-{}.zip",
        loc.owner,
        loc.repo,
        loc.git_ref.replace('/', "-")
    )
}

/// Under the package archive: one file per URL holding the name it was
/// stored under when the URL itself did not give one
const NAMES_DIR: &str = ".names";

/// Failures that mean "this item is not there" rather than "stop"
fn is_missing(err: &FetchError) -> bool {
    matches!(err, FetchError::NotFound { .. } | FetchError::Status { .. })
}

impl FileInstaller<'_> {
    pub(super) fn install_remote(&self, source: &str, target: Option<&str>) -> Result<ItemOutcome> {
        self.console.line(&format!("\n    * {source}"));

        if is_url(source) {
            return self.install_url(source, target);
        }

        let loc = Location::parse(source).ok_or_else(|| MlhubError::DependencyFileTypeUnknown {
            location: source.to_string(),
        })?;

        if let Some(plan) = self.cached_location_plan(&loc, target)? {
            debug!("'{}' found in the archive, skipping resolution", source);
            self.console.cached(&plan.archive);
            return self.publish(&plan, loc.path.as_deref()).map(ItemOutcome::Installed);
        }

        let (kind, url) = match loc.get_res_type(self.fetch) {
            Ok(resolved) => resolved,
            Err(MlhubError::DependencyFileNotFound { .. }) => {
                debug!("'{}' not visible over HTTP, may be private", source);
                return self.install_private(&loc, target);
            }
            Err(err) => return Err(err),
        };

        let plan = self.location_plan(&loc, kind, &url, target)?;
        if self.obtain(&plan, &url)? {
            return self.publish(&plan, loc.path.as_deref()).map(ItemOutcome::Installed);
        }
        // The archive endpoint answers 404 for private repositories too
        if kind == ResourceKind::Repo {
            debug!("No archive for '{}', may be private", source);
            return self.install_private(&loc, target);
        }
        Ok(self.not_found(&url))
    }

    fn install_url(&self, url: &str, target: Option<&str>) -> Result<ItemOutcome> {
        let Some(filename) = self.remote_filename(url, target)? else {
            return Ok(self.not_found(url));
        };
        let plan = Plan::new(self.dirs, ResourceKind::File, &filename, "", target)?;
        if !self.obtain(&plan, url)? {
            return Ok(self.not_found(url));
        }
        self.publish(&plan, None).map(ItemOutcome::Installed)
    }

    /// Name for a downloaded file: the URL's last segment when it has an
    /// extension, else the server's suggestion, else a generated name.
    ///
    /// Names not taken from the URL are recorded so a cached copy is found
    /// again without asking the server.
    fn remote_filename(&self, url: &str, target: Option<&str>) -> Result<Option<String>> {
        let base = url_basename(url);
        if base.contains('.') {
            return Ok(Some(base));
        }
        let known = self
            .recorded_name(url)
            .into_iter()
            .chain((!base.is_empty()).then(|| base.clone()));
        for name in known {
            if Plan::new(self.dirs, ResourceKind::File, &name, "", target)?.is_cached() {
                return Ok(Some(name));
            }
        }

        let name = match self.fetch.suggested_filename(url) {
            Ok(Some(name)) => name,
            Ok(None) if !base.is_empty() => return Ok(Some(base)),
            Ok(None) => {
                let name = format!("mlhubtmp-{}", uuid::Uuid::new_v4().simple());
                warn!("No file name for '{}', storing it as '{}'", url, name);
                name
            }
            Err(err) if is_missing(&err) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        self.record_name(url, &name)?;
        Ok(Some(name))
    }

    fn name_record(&self, url: &str) -> PathBuf {
        let key = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_URL, url.as_bytes());
        self.dirs
            .archive
            .join(NAMES_DIR)
            .join(key.simple().to_string())
    }

    fn recorded_name(&self, url: &str) -> Option<String> {
        let name = fs::read_to_string(self.name_record(url)).ok()?;
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    fn record_name(&self, url: &str, name: &str) -> Result<()> {
        let record = self.name_record(url);
        let write_failed = |e: std::io::Error| MlhubError::FileWriteFailed {
            path: record.display().to_string(),
            reason: e.to_string(),
        };
        if let Some(parent) = record.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
        fs::write(&record, name).map_err(write_failed)
    }

    fn location_plan(
        &self,
        loc: &Location,
        kind: ResourceKind,
        url: &str,
        target: Option<&str>,
    ) -> Result<Plan> {
        match kind {
            ResourceKind::Repo => Plan::new(self.dirs, kind, &repo_archive_name(loc), &loc.repo, target),
            ResourceKind::Dir => {
                Plan::new(self.dirs, kind, &repo_archive_name(loc), loc.folder_name(), target)
            }
            ResourceKind::File => {
                let name = url_basename(url);
                let name = if name.is_empty() { loc.folder_name().to_string() } else { name };
                Plan::new(self.dirs, kind, &name, "", target)
            }
        }
    }

    /// A plan whose download is already archived, found without asking the
    /// hosting service what the path is
    fn cached_location_plan(&self, loc: &Location, target: Option<&str>) -> Result<Option<Plan>> {
        if loc.path.is_none() {
            let plan = self.location_plan(loc, ResourceKind::Repo, "", target)?;
            return Ok(plan.is_cached().then_some(plan));
        }
        for kind in [ResourceKind::Dir, ResourceKind::File] {
            let plan = self.location_plan(loc, kind, "", target)?;
            if plan.is_cached() {
                return Ok(Some(plan));
            }
        }
        Ok(None)
    }

    /// Make sure the raw download is in the archive; `false` when the
    /// server does not have it
    fn obtain(&self, plan: &Plan, url: &str) -> Result<bool> {
        if plan.is_cached() {
            self.console.cached(&plan.archive);
            return Ok(true);
        }

        self.console.downloading(url, &plan.install);
        if let Some(parent) = plan.archive.parent() {
            fs::create_dir_all(parent).map_err(|e| MlhubError::FileWriteFailed {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        match self.fetch.download(url, &plan.archive) {
            Ok(download) => {
                debug!("Fetched {} bytes from {}", download.bytes, url);
                Ok(true)
            }
            Err(err) if is_missing(&err) => {
                warn!("{}", err);
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Unpack when needed, then link every cached file into the package
    fn publish(&self, plan: &Plan, sub_path: Option<&str>) -> Result<Vec<PathBuf>> {
        let files = if !plan.need_unzip {
            vec![String::new()]
        } else {
            self.console.extracting(&plan.archive, &plan.cache);
            match plan.kind {
                ResourceKind::Dir => self.unpack_subdir(plan, sub_path.unwrap_or_default())?,
                _ => unpack_with_promote(&plan.archive, &plan.cache, Some(&plan.filename), false)?.files,
            }
        };

        files
            .iter()
            .map(|rel| {
                let origin = join_slash(&plan.cache, rel);
                let goal = join_slash(&plan.install, rel);
                make_symlink(&origin, &goal).map_err(|e| MlhubError::FileWriteFailed {
                    path: goal.display().to_string(),
                    reason: e.to_string(),
                })?;
                Ok(goal)
            })
            .collect()
    }

    /// Unpack a repository download and keep only `sub_path` of it
    fn unpack_subdir(&self, plan: &Plan, sub_path: &str) -> Result<Vec<String>> {
        let scratch = temp::scratch_dir()?;
        let tree = scratch.path().join("repo");
        unpack_with_promote(&plan.archive, &tree, Some(&plan.filename), false)?;

        let sub = Target::parse(sub_path)?.under(&tree);
        if !sub.is_dir() {
            return Err(MlhubError::DependencyFileNotFound {
                location: sub_path.to_string(),
            });
        }
        fs::create_dir_all(&plan.cache)?;
        Ok(merge_folder(&sub, &plan.cache)?)
    }

    pub(super) fn not_found(&self, url: &str) -> ItemOutcome {
        self.console.line(&format!(
            "\nmlhub: Failed to get file dependency: {url}\n       Please notify package author."
        ));
        ItemOutcome::NotFound
    }
}
