//! Process-wide settings: the MLHub home directory and HTTP behaviour
//!
//! The home directory is resolved from `--init-dir`, then the `MLINIT`
//! environment variable, then `~/.mlhub`. Optional overrides are read from
//! `<home>/.config/settings.yaml`:
//!
//! ```yaml
//! http:
//!   timeout_secs: 30
//!   connect_timeout_secs: 10
//!   retries: 3
//!   user_agent: mlhub/0.4.0
//! ssh_key: ~/.ssh/id_ed25519
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MlhubError, Result};

/// Environment variable overriding the MLHub home directory
pub const MLINIT_ENV: &str = "MLINIT";

/// Default home directory name under the user's home
const DEFAULT_HOME_DIR: &str = ".mlhub";

/// Settings file, relative to the home directory
const SETTINGS_FILE: &str = ".config/settings.yaml";

/// Timeouts and retry policy for every HTTP request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub retries: u32,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            retries: 3,
            user_agent: format!("mlhub/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Contents of `settings.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub http: HttpSettings,
    pub ssh_key: Option<PathBuf>,
}

/// Resolved settings for one invocation
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of installed packages and of the `.cache`, `.archive`, `.config` trees
    pub home: PathBuf,
    pub http: HttpSettings,
    /// Private key offered to git over SSH before the usual `~/.ssh` keys
    pub identity: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from the command line override and the environment
    pub fn load(init_dir: Option<&Path>, identity: Option<&Path>) -> Result<Self> {
        let home = resolve_home(init_dir)?;
        let file = SettingsFile::load(&home.join(SETTINGS_FILE))?;

        Ok(Self {
            identity: identity
                .map(Path::to_path_buf)
                .or_else(|| file.ssh_key.map(|key| expand_tilde(&key))),
            http: file.http,
            home,
        })
    }
}

impl SettingsFile {
    /// Load the settings file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        debug!("Loading settings from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| MlhubError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| MlhubError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Resolve the MLHub home directory: explicit override, `MLINIT`, `~/.mlhub`.
///
/// Always absolute; cache symlinks are created with the home in their target.
pub fn resolve_home(init_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = init_dir {
        return absolutize(&expand_tilde(dir));
    }

    if let Ok(dir) = std::env::var(MLINIT_ENV)
        && !dir.is_empty()
    {
        return absolutize(&expand_tilde(Path::new(&dir)));
    }

    let home = dirs::home_dir().ok_or(MlhubError::NoHomeDirectory)?;
    absolutize(&home.join(DEFAULT_HOME_DIR))
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| MlhubError::IoError {
        message: format!("Cannot resolve '{}': {e}", path.display()),
    })?;
    Ok(dunce::simplified(&absolute).to_path_buf())
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest)),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_init_dir_wins_over_env() {
        let temp = TempDir::new().unwrap();
        unsafe { std::env::set_var(MLINIT_ENV, "/somewhere/else") };
        let home = resolve_home(Some(temp.path())).unwrap();
        unsafe { std::env::remove_var(MLINIT_ENV) };
        assert_eq!(home, temp.path());
    }

    #[test]
    #[serial]
    fn test_env_used_without_override() {
        unsafe { std::env::set_var(MLINIT_ENV, "/opt/mlhub") };
        let home = resolve_home(None).unwrap();
        unsafe { std::env::remove_var(MLINIT_ENV) };
        assert_eq!(home, PathBuf::from("/opt/mlhub"));
    }

    #[test]
    #[serial]
    fn test_relative_home_made_absolute() {
        let home = resolve_home(Some(Path::new("models/hub"))).unwrap();
        assert!(home.is_absolute());
        assert_eq!(home, std::env::current_dir().unwrap().join("models/hub"));

        unsafe { std::env::set_var(MLINIT_ENV, "rel-hub") };
        let home = resolve_home(None).unwrap();
        unsafe { std::env::remove_var(MLINIT_ENV) };
        assert_eq!(home, std::env::current_dir().unwrap().join("rel-hub"));
    }

    #[test]
    #[serial]
    fn test_default_home() {
        unsafe { std::env::remove_var(MLINIT_ENV) };
        if let Some(user_home) = dirs::home_dir() {
            assert_eq!(resolve_home(None).unwrap(), user_home.join(".mlhub"));
        }
    }

    #[test]
    fn test_missing_settings_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = SettingsFile::load(&temp.path().join("settings.yaml")).unwrap();
        assert_eq!(settings, SettingsFile::default());
        assert_eq!(settings.http.retries, 3);
    }

    #[test]
    fn test_partial_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yaml");
        std::fs::write(&path, "http:\n  timeout_secs: 5\nssh_key: /keys/deploy\n").unwrap();

        let settings = SettingsFile::load(&path).unwrap();
        assert_eq!(settings.http.timeout_secs, 5);
        assert_eq!(settings.http.connect_timeout_secs, 10);
        assert_eq!(settings.ssh_key, Some(PathBuf::from("/keys/deploy")));
    }

    #[test]
    fn test_invalid_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yaml");
        std::fs::write(&path, "http: [unclosed").unwrap();

        let err = SettingsFile::load(&path).unwrap_err();
        assert!(matches!(err, MlhubError::ConfigParseFailed { .. }));
    }

    #[test]
    fn test_identity_flag_overrides_settings_key() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".config")).unwrap();
        std::fs::write(
            temp.path().join(SETTINGS_FILE),
            "ssh_key: /keys/from-settings\n",
        )
        .unwrap();

        let settings = Settings::load(Some(temp.path()), None).unwrap();
        assert_eq!(settings.identity, Some(PathBuf::from("/keys/from-settings")));

        let settings = Settings::load(Some(temp.path()), Some(Path::new("/keys/flag"))).unwrap();
        assert_eq!(settings.identity, Some(PathBuf::from("/keys/flag")));
    }
}
