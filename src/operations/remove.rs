//! Remove operation
//!
//! The install and config directories go together. Cached downloads are
//! kept unless the user asks for them to go too, so a later reinstall can
//! reuse them.

use std::path::Path;

use tracing::info;

use crate::cache::PackageDirs;
use crate::common::fs::remove_file_or_dir;
use crate::error::{MlhubError, Result};
use crate::ui::{Console, NextStep, Prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed { cache_removed: bool },
    Cancelled,
}

/// High-level remove operation
pub struct RemoveOperation<'a> {
    home: &'a Path,
    prompt: &'a dyn Prompt,
    /// Skip both questions, keeping the cache
    yes: bool,
    console: Console,
}

impl<'a> RemoveOperation<'a> {
    pub fn new(home: &'a Path, prompt: &'a dyn Prompt, yes: bool, console: Console) -> Self {
        Self {
            home,
            prompt,
            yes,
            console,
        }
    }

    pub fn execute(&self, name: &str) -> Result<RemoveOutcome> {
        let dirs = PackageDirs::new(self.home, name)?;
        if !dirs.is_installed() {
            return Err(MlhubError::PackageNotInstalled {
                name: name.to_string(),
            });
        }

        if !self.yes
            && !self
                .prompt
                .confirm(&format!("Remove '{}/'", dirs.install.display()), false)?
        {
            self.console.line("Nothing removed.");
            return Ok(RemoveOutcome::Cancelled);
        }

        info!("Removing '{}'", name);
        remove_file_or_dir(&dirs.install)?;
        remove_file_or_dir(&dirs.config)?;

        let cache_removed = !self.yes
            && dirs.cache.exists()
            && self.prompt.confirm(
                &format!("Remove cache '{}/' as well", dirs.cache.display()),
                false,
            )?;
        if cache_removed {
            remove_file_or_dir(&dirs.cache)?;
            remove_file_or_dir(&dirs.archive)?;
        }

        self.console.next_steps(&[NextStep::Installed], None);
        Ok(RemoveOutcome::Removed { cache_removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ScriptedPrompt;
    use std::fs;
    use tempfile::TempDir;

    fn populated() -> (TempDir, PackageDirs) {
        let home = TempDir::new().unwrap();
        let dirs = PackageDirs::new(home.path(), "audit").unwrap();
        for dir in [&dirs.install, &dirs.cache, &dirs.archive, &dirs.config] {
            fs::create_dir_all(dir).unwrap();
            fs::write(dir.join("f"), "x").unwrap();
        }
        (home, dirs)
    }

    #[test]
    fn test_yes_removes_package_and_keeps_cache() {
        let (home, dirs) = populated();
        let prompt = ScriptedPrompt::new(&[]);

        let outcome = RemoveOperation::new(home.path(), &prompt, true, Console::new(true))
            .execute("audit")
            .unwrap();

        assert_eq!(outcome, RemoveOutcome::Removed { cache_removed: false });
        assert!(prompt.asked().is_empty());
        assert!(!dirs.install.exists());
        assert!(!dirs.config.exists());
        assert!(dirs.cache.exists());
        assert!(dirs.archive.exists());
    }

    #[test]
    fn test_cache_removed_when_asked() {
        let (home, dirs) = populated();
        let prompt = ScriptedPrompt::new(&[true, true]);

        let outcome = RemoveOperation::new(home.path(), &prompt, false, Console::new(true))
            .execute("audit")
            .unwrap();

        assert_eq!(outcome, RemoveOutcome::Removed { cache_removed: true });
        assert_eq!(prompt.asked().len(), 2);
        assert!(prompt.asked()[1].starts_with("Remove cache '"));
        assert!(!dirs.cache.exists());
        assert!(!dirs.archive.exists());
    }

    #[test]
    fn test_default_answer_keeps_everything() {
        let (home, dirs) = populated();
        let prompt = ScriptedPrompt::new(&[]);

        let outcome = RemoveOperation::new(home.path(), &prompt, false, Console::new(true))
            .execute("audit")
            .unwrap();

        assert_eq!(outcome, RemoveOutcome::Cancelled);
        assert!(dirs.install.exists());
        assert!(dirs.config.exists());
    }

    #[test]
    fn test_missing_package() {
        let home = TempDir::new().unwrap();
        let err = RemoveOperation::new(home.path(), &ScriptedPrompt::new(&[]), true, Console::new(true))
            .execute("audit")
            .unwrap_err();
        assert!(matches!(err, MlhubError::PackageNotInstalled { .. }));
    }

    #[test]
    fn test_hidden_tree_is_not_a_package() {
        let (home, dirs) = populated();
        for name in [".cache", "..", ""] {
            let err = RemoveOperation::new(home.path(), &ScriptedPrompt::new(&[]), true, Console::new(true))
                .execute(name)
                .unwrap_err();
            assert!(matches!(err, MlhubError::InvalidPackageName { .. }), "{name:?}");
        }
        assert!(dirs.cache.exists());
        assert!(home.path().exists());
    }
}
