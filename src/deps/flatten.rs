use serde_yaml::Value;

use super::FileSpec;
use crate::error::{MlhubError, Result};

/// One element of a dependency list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafItem {
    /// `pillow`, `dplyr=1.2.3`, a URL
    Plain(String),
    /// A single-key mapping such as `file: environment.yaml` or `<url>: data/`
    Keyed(String, Option<String>),
}

impl LeafItem {
    pub fn plain(value: impl Into<String>) -> Self {
        LeafItem::Plain(value.into())
    }
}

impl std::fmt::Display for LeafItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeafItem::Plain(value) => write!(f, "{value}"),
            LeafItem::Keyed(key, Some(value)) => write!(f, "{key}: {value}"),
            LeafItem::Keyed(key, None) => write!(f, "{key}"),
        }
    }
}

/// Nested dependency declaration, in manifest order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepsTree {
    Leaf(Vec<LeafItem>),
    Node(Vec<(String, DepsTree)>),
}

/// Items of one flattened category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyItems {
    Packages(Vec<LeafItem>),
    Files(FileSpec),
}

/// A category path (lower-cased, outermost first) with its items.
///
/// The path is empty when the whole `dependencies:` value is a plain list,
/// in which case the package language decides what the items are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyItem {
    pub category: Vec<String>,
    pub items: DependencyItems,
}

impl DependencyItem {
    /// Innermost category name
    pub fn category_name(&self) -> Option<&str> {
        self.category.last().map(String::as_str)
    }
}

/// Whether a manifest key names the file category (`files`, `file`, `f`...)
pub fn is_files_category(key: &str) -> bool {
    !key.is_empty() && "files".starts_with(key.to_lowercase().as_str())
}

fn split_commas(value: &str) -> Vec<LeafItem> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(LeafItem::plain)
        .collect()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn malformed(reason: impl Into<String>) -> MlhubError {
    MlhubError::ManifestMalformed {
        location: "dependencies".to_string(),
        reason: reason.into(),
    }
}

impl DepsTree {
    /// Build the tree from the YAML value of a `dependencies:` block
    pub fn from_yaml(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(DepsTree::Leaf(Vec::new())),
            Value::String(s) => Ok(DepsTree::Leaf(split_commas(s))),
            Value::Number(_) | Value::Bool(_) => {
                Ok(DepsTree::Leaf(scalar_to_string(value).into_iter().map(LeafItem::Plain).collect()))
            }
            Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
            Value::Sequence(items) => {
                let mut leaves = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Mapping(map) => {
                            for (key, target) in map {
                                let key = scalar_to_string(key)
                                    .ok_or_else(|| malformed("list entries must be names or single-key mappings"))?;
                                leaves.push(LeafItem::Keyed(key, scalar_to_string(target)));
                            }
                        }
                        Value::Null => {}
                        other => {
                            let value = scalar_to_string(other)
                                .ok_or_else(|| malformed("nested lists are not allowed in dependency lists"))?;
                            leaves.push(LeafItem::Plain(value));
                        }
                    }
                }
                Ok(DepsTree::Leaf(leaves))
            }
            Value::Mapping(map) => {
                let mut children = Vec::with_capacity(map.len());
                for (key, child) in map {
                    let key = scalar_to_string(key)
                        .ok_or_else(|| malformed("dependency categories must be names"))?;
                    children.push((key, Self::from_yaml(child)?));
                }
                Ok(DepsTree::Node(children))
            }
        }
    }
}

fn file_spec_of(tree: &DepsTree) -> FileSpec {
    let mut spec = FileSpec::new();
    match tree {
        DepsTree::Leaf(items) => {
            for item in items {
                match item {
                    LeafItem::Plain(source) => spec.insert(source.clone(), None),
                    LeafItem::Keyed(source, target) => spec.insert(source.clone(), target.clone()),
                }
            }
        }
        // `files: {<url>: data/}` written as a mapping rather than a list
        DepsTree::Node(children) => {
            for (source, target) in children {
                let target = match target {
                    DepsTree::Leaf(items) if !items.is_empty() => Some(
                        items
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(","),
                    ),
                    _ => None,
                };
                spec.insert(source.clone(), target);
            }
        }
    }
    spec
}

fn flatten_into(tree: &DepsTree, category: &[String], out: &mut Vec<DependencyItem>) {
    match tree {
        DepsTree::Leaf(items) => out.push(DependencyItem {
            category: category.to_vec(),
            items: DependencyItems::Packages(items.clone()),
        }),
        DepsTree::Node(children) => {
            for (key, child) in children {
                if is_files_category(key) {
                    out.push(DependencyItem {
                        category: vec!["files".to_string()],
                        items: DependencyItems::Files(file_spec_of(child)),
                    });
                } else {
                    let mut path = category.to_vec();
                    path.push(key.to_lowercase());
                    flatten_into(child, &path, out);
                }
            }
        }
    }
}

/// Flatten a dependency tree into `(category path, items)` pairs in
/// document order
pub fn flatten(tree: &DepsTree) -> Vec<DependencyItem> {
    let mut out = Vec::new();
    flatten_into(tree, &[], &mut out);
    out
}
