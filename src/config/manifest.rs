//! Package manifest (`MLHUB.yaml`, or legacy `DESCRIPTION.yaml`/`DESCRIPTION.yml`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::deps::{self, DependencyItem, DependencyItems, DepsTree, FileSpec};
use crate::error::{MlhubError, Result};

pub const MLHUB_YAML: &str = "MLHUB.yaml";
pub const DESCRIPTION_YAML: &str = "DESCRIPTION.yaml";
pub const DESCRIPTION_YML: &str = "DESCRIPTION.yml";

/// Manifest names in lookup order
pub const MANIFEST_NAMES: [&str; 3] = [MLHUB_YAML, DESCRIPTION_YAML, DESCRIPTION_YML];

/// The `meta:` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Meta {
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub languages: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Versions are often written unquoted (`version: 1.2`)
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a version string, found {other:?}"
        ))),
    }
}

/// A parsed manifest; the full document is kept for order-preserving lookups
#[derive(Debug, Clone)]
pub struct Manifest {
    pub meta: Meta,
    document: Value,
    source: String,
}

impl Manifest {
    /// Parse manifest text; `source` names where it came from in error messages
    pub fn parse(text: &str, source: &str) -> Result<Self> {
        let malformed = |reason: String| MlhubError::ManifestMalformed {
            location: source.to_string(),
            reason,
        };

        let document: Value = serde_yaml::from_str(text).map_err(|e| malformed(e.to_string()))?;
        let meta = document
            .get("meta")
            .ok_or_else(|| malformed("missing 'meta' section".to_string()))?;
        let meta: Meta = serde_yaml::from_value(meta.clone()).map_err(|e| malformed(e.to_string()))?;

        Ok(Self {
            meta,
            document,
            source: source.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8], source: &str) -> Result<Self> {
        Self::parse(&String::from_utf8_lossy(bytes), source)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| MlhubError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Load the manifest of an unpacked or installed package directory
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load(&find_in_dir(dir)?)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// `dependencies:` at the top level, else under `meta:`
    pub fn dependencies(&self) -> Option<&Value> {
        self.document
            .get("dependencies")
            .or_else(|| self.document.get("meta").and_then(|m| m.get("dependencies")))
            .filter(|v| !v.is_null())
    }

    /// Flattened dependency list, empty when the manifest declares none
    pub fn flattened_dependencies(&self) -> Result<Vec<DependencyItem>> {
        match self.dependencies() {
            Some(value) => DepsTree::from_yaml(value)
                .map(|tree| deps::flatten(&tree))
                .map_err(|e| self.relocate(e)),
            None => Ok(Vec::new()),
        }
    }

    /// The file dependencies, from `dependencies: files:` or a top-level `files:`
    pub fn file_spec(&self) -> Result<Option<FileSpec>> {
        let from_deps = self
            .flattened_dependencies()?
            .into_iter()
            .find_map(|item| match item.items {
                DependencyItems::Files(spec) => Some(spec),
                DependencyItems::Packages(_) => None,
            });
        if from_deps.is_some() {
            return Ok(from_deps);
        }

        let Some(files) = self.document.get("files").filter(|v| !v.is_null()) else {
            return Ok(None);
        };
        let mut wrapper = serde_yaml::Mapping::new();
        wrapper.insert(Value::String("files".to_string()), files.clone());
        let tree = DepsTree::from_yaml(&Value::Mapping(wrapper)).map_err(|e| self.relocate(e))?;

        Ok(deps::flatten(&tree).into_iter().find_map(|item| match item.items {
            DependencyItems::Files(spec) => Some(spec),
            DependencyItems::Packages(_) => None,
        }))
    }

    /// Command names in manifest order
    pub fn commands(&self) -> Vec<String> {
        match self.document.get("commands") {
            Some(Value::Mapping(map)) => map
                .keys()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect(),
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn relocate(&self, err: MlhubError) -> MlhubError {
        match err {
            MlhubError::ManifestMalformed { reason, .. } => MlhubError::ManifestMalformed {
                location: self.source.clone(),
                reason,
            },
            other => other,
        }
    }
}

/// First manifest file present in `dir`, in lookup order
pub fn find_in_dir(dir: &Path) -> Result<PathBuf> {
    MANIFEST_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| MlhubError::ManifestNotFound {
            location: dir.display().to_string(),
        })
}
