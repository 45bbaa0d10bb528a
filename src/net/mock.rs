//! In-memory [`Fetch`] for tests: a URL table plus request counters

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use super::{Download, Fetch, FetchError};

#[derive(Default)]
pub struct MockFetch {
    files: HashMap<String, (Vec<u8>, Option<String>)>,
    unreachable: HashSet<String>,
    gets: Cell<usize>,
    downloads: Cell<usize>,
    checks: Cell<usize>,
    filename_lookups: Cell<usize>,
}

impl MockFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`
    pub fn with_file(mut self, url: &str, body: &[u8]) -> Self {
        self.files.insert(url.to_string(), (body.to_vec(), None));
        self
    }

    /// Serve `body` at `url` with a `Content-Disposition` filename
    pub fn with_named_file(mut self, url: &str, body: &[u8], filename: &str) -> Self {
        self.files
            .insert(url.to_string(), (body.to_vec(), Some(filename.to_string())));
        self
    }

    /// Fail `url` with a transport error
    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    pub fn gets(&self) -> usize {
        self.gets.get()
    }

    pub fn downloads(&self) -> usize {
        self.downloads.get()
    }

    pub fn checks(&self) -> usize {
        self.checks.get()
    }

    /// Every request of any kind
    pub fn request_count(&self) -> usize {
        self.gets.get() + self.downloads.get() + self.checks.get() + self.filename_lookups.get()
    }

    fn lookup(&self, url: &str) -> Result<&(Vec<u8>, Option<String>), FetchError> {
        if self.unreachable.contains(url) {
            return Err(FetchError::Transport {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        self.files.get(url).ok_or_else(|| FetchError::NotFound {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

impl Fetch for MockFetch {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        bump(&self.gets);
        self.lookup(url).map(|(body, _)| body.clone())
    }

    fn download(&self, url: &str, dest: &Path) -> Result<Download, FetchError> {
        bump(&self.downloads);
        let (body, _) = self.lookup(url)?;
        let io = |e: std::io::Error| FetchError::Io {
            path: dest.display().to_string(),
            reason: e.to_string(),
        };
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(io)?;
        }
        fs::write(dest, body).map_err(io)?;
        Ok(Download {
            bytes: body.len() as u64,
            content_length: Some(body.len() as u64),
        })
    }

    fn exists(&self, url: &str) -> Result<bool, FetchError> {
        bump(&self.checks);
        match self.lookup(url) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn suggested_filename(&self, url: &str) -> Result<Option<String>, FetchError> {
        bump(&self.filename_lookups);
        self.lookup(url).map(|(_, name)| name.clone())
    }
}
