//! Where a remote item lands in the archive, cache and install trees

use std::path::PathBuf;

use crate::archive::is_archive_file;
use crate::cache::{PackageDirs, Target};
use crate::error::Result;
use crate::location::ResourceKind;

/// Resolved placement of one remote `files` item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub kind: ResourceKind,
    /// Name the download is stored under
    pub filename: String,
    pub target: Target,
    /// Whether the download is an archive unpacked into a directory target
    pub need_unzip: bool,
    /// Ready-to-use content: a file, or the directory the archive unpacks into
    pub cache: PathBuf,
    /// The raw download; the same as `cache` when nothing is unpacked
    pub archive: PathBuf,
    pub install: PathBuf,
}

impl Plan {
    /// Lay out an item of `kind` named `filename`.
    ///
    /// `folder` names the directory a repository or repository directory
    /// unpacks into when the target does not say otherwise.
    ///
    /// | kind      | target        | installed at           |
    /// |-----------|---------------|------------------------|
    /// | file      | none          | `<filename>`           |
    /// | file      | `dir/`        | `dir/<filename>`, or unpacked into `dir/` for archives |
    /// | file      | `path`        | `path`                 |
    /// | repo, dir | none          | `<folder>/`            |
    /// | repo, dir | `dir/`        | `dir/<folder>/`        |
    /// | repo, dir | `name`        | `name/`                |
    pub fn new(
        dirs: &PackageDirs,
        kind: ResourceKind,
        filename: &str,
        folder: &str,
        target: Option<&str>,
    ) -> Result<Self> {
        let is_file = kind == ResourceKind::File;
        let is_archive = !is_file || is_archive_file(filename);

        let raw = match target {
            None if is_file => filename.to_string(),
            None => format!("{folder}/"),
            Some(t) if is_file && is_dir_target(t) && !is_archive => {
                format!("{}/{filename}", t.trim_end_matches(['/', '\\']))
            }
            Some(t) if is_file => t.to_string(),
            Some(t) if is_dir_target(t) => {
                format!("{}/{folder}/", t.trim_end_matches(['/', '\\']))
            }
            Some(t) => format!("{t}/"),
        };
        let target = Target::parse(&raw)?;

        let need_unzip = target.is_dir() && is_archive;
        let cache = dirs.cache_path(&target);
        let archive = if need_unzip {
            dirs.archive_path(&target, filename)
        } else {
            cache.clone()
        };
        let install = dirs.install_path(&target);

        Ok(Self {
            kind,
            filename: filename.to_string(),
            target,
            need_unzip,
            cache,
            archive,
            install,
        })
    }

    /// A previous run left the raw download in place
    pub fn is_cached(&self) -> bool {
        self.archive.is_file()
    }
}

fn is_dir_target(target: &str) -> bool {
    target.is_empty() || target.ends_with('/') || target.ends_with('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn dirs() -> PackageDirs {
        PackageDirs::new(Path::new("/h"), "pkg").unwrap()
    }

    fn plan(kind: ResourceKind, filename: &str, folder: &str, target: Option<&str>) -> Plan {
        Plan::new(&dirs(), kind, filename, folder, target).unwrap()
    }

    #[test]
    fn test_file_targets() {
        let p = plan(ResourceKind::File, "label", "", None);
        assert_eq!(p.target.to_string(), "label");
        assert!(!p.need_unzip);
        assert_eq!(p.archive, p.cache);
        assert_eq!(p.install, PathBuf::from("/h/pkg/label"));

        let p = plan(ResourceKind::File, "cat.RData", "", Some("data/"));
        assert_eq!(p.target.to_string(), "data/cat.RData");
        assert_eq!(p.cache, PathBuf::from("/h/.cache/pkg/data/cat.RData"));

        let p = plan(ResourceKind::File, "def.RData", "", Some("data/dog.RData"));
        assert_eq!(p.target.to_string(), "data/dog.RData");
    }

    #[test]
    fn test_archive_file_into_directory_is_unpacked() {
        let p = plan(ResourceKind::File, "xyz.zip", "", Some("res/"));
        assert!(p.need_unzip);
        assert_eq!(p.cache, PathBuf::from("/h/.cache/pkg/res"));
        assert_eq!(p.archive, PathBuf::from("/h/.archive/pkg/res/xyz.zip"));

        let p = plan(ResourceKind::File, "z.zip", "", Some("./"));
        assert!(p.need_unzip);
        assert_eq!(p.cache, PathBuf::from("/h/.cache/pkg"));
        assert_eq!(p.archive, PathBuf::from("/h/.archive/pkg/z.zip"));

        let p = plan(ResourceKind::File, "uvw.zip", "", Some("res/rst.zip"));
        assert!(!p.need_unzip);
        assert_eq!(p.cache, PathBuf::from("/h/.cache/pkg/res/rst.zip"));

        let p = plan(ResourceKind::File, "uvw.zip", "", None);
        assert!(!p.need_unzip);
    }

    #[test]
    fn test_repo_and_dir_targets() {
        let zip = "acme-widgets-v1.zip";
        let p = plan(ResourceKind::Repo, zip, "widgets", None);
        assert_eq!(p.target.to_string(), "widgets/");
        assert!(p.need_unzip);
        assert_eq!(p.archive, PathBuf::from("/h/.archive/pkg/widgets/acme-widgets-v1.zip"));

        let p = plan(ResourceKind::Repo, zip, "widgets", Some("mlhubrepo"));
        assert_eq!(p.target.to_string(), "mlhubrepo/");

        let p = plan(ResourceKind::Dir, zip, "doc", Some("repo/"));
        assert_eq!(p.target.to_string(), "repo/doc/");
        assert_eq!(p.install, PathBuf::from("/h/pkg/repo/doc"));
    }
}
