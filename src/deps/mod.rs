//! Dependency specifications from the package manifest
//!
//! A `dependencies:` block is an arbitrarily nested mapping whose leaves are
//! either comma separated strings or lists. [`flatten`] turns it into an
//! ordered list of `(category path, items)` pairs; the `files` category is
//! normalized into a [`FileSpec`] of `source -> target` entries.

mod flatten;

pub use flatten::{DependencyItem, DependencyItems, DepsTree, flatten};

/// One file dependency: where to get it and where to put it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// URL, hosting reference, or path relative to the package archive
    pub source: String,
    /// Destination relative to the package directory. A trailing `/` means
    /// "inside this directory".
    pub target: Option<String>,
}

/// Ordered `source -> target` map; inserting an existing source replaces its
/// target but keeps its position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSpec {
    entries: Vec<FileEntry>,
}

impl FileSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, target: Option<String>) {
        let source = source.into();
        if let Some(existing) = self.entries.iter_mut().find(|e| e.source == source) {
            existing.target = target;
        } else {
            self.entries.push(FileEntry { source, target });
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, source: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.source == source)
    }
}

impl<'a> IntoIterator for &'a FileSpec {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, Option<String>)> for FileSpec {
    fn from_iter<I: IntoIterator<Item = (S, Option<String>)>>(iter: I) -> Self {
        let mut spec = FileSpec::new();
        for (source, target) in iter {
            spec.insert(source, target);
        }
        spec
    }
}
