//! Configure operation
//!
//! Fetches the remote `files` of an installed package into its cache and
//! links them in. Other dependency categories (`cran`, `pip`, `system`...)
//! and `configure.*` scripts are reported for the user to act on.

use std::fs;
use std::path::{Path, PathBuf};

use console::Style;
use tracing::info;

use crate::cache::PackageDirs;
use crate::config::Manifest;
use crate::deps::DependencyItems;
use crate::error::{MlhubError, Result};
use crate::git::RepoCloner;
use crate::installer::{FileInstaller, InstallMode};
use crate::net::Fetch;
use crate::ui::{Console, NextStep};

/// Stem of the optional per-package configuration scripts
const SCRIPT_STEM: &str = "configure";

/// Dependencies left to external installers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// `cran`, `python/pip`..., or the package language for a plain list
    pub category: String,
    pub items: Vec<String>,
}

/// A configuration script shipped with the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub path: PathBuf,
    pub interpreter: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureReport {
    /// Paths created in the package directory
    pub files: Vec<PathBuf>,
    pub requirements: Vec<Requirement>,
    pub scripts: Vec<Script>,
}

/// Interpreter for a `configure.<ext>` script
pub fn script_interpreter(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    match extension.as_str() {
        "sh" => Ok("bash"),
        "R" => Ok("Rscript"),
        "py" => Ok("python3"),
        _ => Err(MlhubError::UnsupportedScriptExtension { extension }),
    }
}

/// `configure.*` scripts at the package root, sorted by name
fn find_scripts(install: &Path) -> Result<Vec<Script>> {
    let mut scripts = Vec::new();
    for entry in fs::read_dir(install)? {
        let path = entry?.path();
        let is_script = path.is_file()
            && path
                .file_stem()
                .is_some_and(|stem| stem.to_string_lossy() == SCRIPT_STEM);
        if is_script {
            let interpreter = script_interpreter(&path)?;
            scripts.push(Script { path, interpreter });
        }
    }
    scripts.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(scripts)
}

/// High-level configure operation
pub struct ConfigureOperation<'a> {
    home: &'a Path,
    fetch: &'a dyn Fetch,
    cloner: &'a dyn RepoCloner,
    identity: Option<&'a Path>,
    console: Console,
}

impl<'a> ConfigureOperation<'a> {
    pub fn new(
        home: &'a Path,
        fetch: &'a dyn Fetch,
        cloner: &'a dyn RepoCloner,
        console: Console,
    ) -> Self {
        Self {
            home,
            fetch,
            cloner,
            identity: None,
            console,
        }
    }

    pub fn with_identity(mut self, identity: Option<&'a Path>) -> Self {
        self.identity = identity;
        self
    }

    pub fn execute(&self, name: &str) -> Result<ConfigureReport> {
        let dirs = PackageDirs::new(self.home, name)?;
        if !dirs.is_installed() {
            return Err(MlhubError::PackageNotInstalled {
                name: name.to_string(),
            });
        }
        info!("Configuring '{}'", name);
        let manifest = Manifest::load_from_dir(&dirs.install)?;

        let files = match manifest.file_spec()? {
            Some(spec) if !spec.is_empty() => FileInstaller::new(&dirs, self.fetch, self.cloner, self.console)
                .with_identity(self.identity)
                .install(&spec, InstallMode::Configuration)?,
            _ => Vec::new(),
        };

        let report = ConfigureReport {
            files,
            requirements: requirements(&manifest)?,
            scripts: find_scripts(&dirs.install)?,
        };
        self.print(&report);
        self.console.next_steps(&[NextStep::Readme], Some(name));
        Ok(report)
    }

    fn print(&self, report: &ConfigureReport) {
        if !report.requirements.is_empty() {
            self.console
                .line("\nThe following dependencies are required:\n");
            for req in &report.requirements {
                self.console.line(&format!(
                    "  {}: {}",
                    Style::new().cyan().apply_to(&req.category),
                    req.items.join(", ")
                ));
            }
        }
        for script in &report.scripts {
            self.console.line(&format!(
                "\nConfiguration script provided, run it with:\n\n  $ {} {}",
                script.interpreter,
                script.path.display()
            ));
        }
        if report.files.is_empty() && report.requirements.is_empty() && report.scripts.is_empty() {
            self.console
                .line("No configuration provided (maybe none is required).");
        }
    }
}

/// Every non-file dependency category, in manifest order
fn requirements(manifest: &Manifest) -> Result<Vec<Requirement>> {
    let language = manifest
        .meta
        .languages
        .as_deref()
        .map_or_else(|| "default".to_string(), str::to_lowercase);

    Ok(manifest
        .flattened_dependencies()?
        .into_iter()
        .filter_map(|item| match item.items {
            DependencyItems::Packages(list) => Some(Requirement {
                category: if item.category.is_empty() {
                    language.clone()
                } else {
                    item.category.join("/")
                },
                items: list.iter().map(ToString::to_string).collect(),
            }),
            DependencyItems::Files(_) => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::fake::FakeCloner;
    use crate::net::mock::MockFetch;
    use tempfile::TempDir;

    const MANIFEST: &str = r"
meta:
  name: audit
  version: 1.0
  languages: R
dependencies:
  R:
    cran: rattle, magrittr
  system: libssl-dev
  files:
    - https://host/audit.csv: data/
";

    fn installed(manifest: &str) -> (TempDir, PathBuf) {
        let home = TempDir::new().unwrap();
        let pkg = home.path().join("audit");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("MLHUB.yaml"), manifest).unwrap();
        (home, pkg)
    }

    #[test]
    fn test_script_interpreter() {
        assert_eq!(script_interpreter(Path::new("configure.sh")).unwrap(), "bash");
        assert_eq!(script_interpreter(Path::new("configure.R")).unwrap(), "Rscript");
        assert_eq!(script_interpreter(Path::new("configure.py")).unwrap(), "python3");
        assert!(matches!(
            script_interpreter(Path::new("configure.pl")),
            Err(MlhubError::UnsupportedScriptExtension { ref extension }) if extension == "pl"
        ));
    }

    #[test]
    fn test_files_fetched_and_requirements_reported() {
        let (home, pkg) = installed(MANIFEST);
        fs::write(pkg.join("configure.sh"), "echo hi").unwrap();
        let fetch = MockFetch::new().with_file("https://host/audit.csv", b"a,b");
        let cloner = FakeCloner::default();

        let report = ConfigureOperation::new(home.path(), &fetch, &cloner, Console::new(true))
            .execute("audit")
            .unwrap();

        assert_eq!(report.files, vec![pkg.join("data/audit.csv")]);
        assert_eq!(fs::read_to_string(pkg.join("data/audit.csv")).unwrap(), "a,b");
        assert_eq!(
            report.requirements,
            vec![
                Requirement {
                    category: "r/cran".to_string(),
                    items: vec!["rattle".to_string(), "magrittr".to_string()],
                },
                Requirement {
                    category: "system".to_string(),
                    items: vec!["libssl-dev".to_string()],
                },
            ]
        );
        assert_eq!(report.scripts.len(), 1);
        assert_eq!(report.scripts[0].interpreter, "bash");
    }

    #[test]
    fn test_second_configure_uses_cache() {
        let (home, _pkg) = installed(MANIFEST);
        let cloner = FakeCloner::default();
        let fetch = MockFetch::new().with_file("https://host/audit.csv", b"a,b");
        ConfigureOperation::new(home.path(), &fetch, &cloner, Console::new(true))
            .execute("audit")
            .unwrap();

        let offline = MockFetch::new();
        ConfigureOperation::new(home.path(), &offline, &cloner, Console::new(true))
            .execute("audit")
            .unwrap();
        assert_eq!(offline.request_count(), 0);
    }

    #[test]
    fn test_plain_list_uses_package_language() {
        let (home, _pkg) = installed(
            "meta:\n  name: audit\n  version: 1\n  languages: Python\ndependencies: numpy, pandas\n",
        );
        let report = ConfigureOperation::new(
            home.path(),
            &MockFetch::new(),
            &FakeCloner::default(),
            Console::new(true),
        )
        .execute("audit")
        .unwrap();

        assert_eq!(report.requirements[0].category, "python");
        assert_eq!(report.requirements[0].items, vec!["numpy", "pandas"]);
        assert!(report.files.is_empty());
    }

    #[test]
    fn test_unsupported_script_is_an_error() {
        let (home, pkg) = installed("meta:\n  name: audit\n  version: 1\n");
        fs::write(pkg.join("configure.pl"), "print 1").unwrap();

        let err = ConfigureOperation::new(
            home.path(),
            &MockFetch::new(),
            &FakeCloner::default(),
            Console::new(true),
        )
        .execute("audit")
        .unwrap_err();
        assert!(matches!(err, MlhubError::UnsupportedScriptExtension { .. }));
    }

    #[test]
    fn test_not_installed() {
        let home = TempDir::new().unwrap();
        let err = ConfigureOperation::new(
            home.path(),
            &MockFetch::new(),
            &FakeCloner::default(),
            Console::new(true),
        )
        .execute("audit")
        .unwrap_err();
        assert!(matches!(err, MlhubError::PackageNotInstalled { .. }));
    }
}
