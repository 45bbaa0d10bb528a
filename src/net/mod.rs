//! HTTP access for package archives, raw repository content and hosting APIs
//!
//! Everything that touches the network goes through the [`Fetch`] trait so the
//! location resolver and the file installer can be driven by an in-memory
//! table in tests. The production implementation is [`HttpClient`].
//!
//! Downloads are written to a `.part` sibling and renamed into place only when
//! the body has been received completely, so a file found at its final path is
//! always a complete copy.

pub mod client;
#[cfg(test)]
pub mod mock;

use std::path::Path;

use thiserror::Error;

use crate::error::MlhubError;

pub use client::HttpClient;

/// Errors that can occur while fetching a URL
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered, but the resource is absent or not accessible
    /// (404, 401, 403, 410). Callers treat this as "maybe private".
    #[error("{url} not found (HTTP {status})")]
    NotFound { url: String, status: u16 },

    /// Any other non-success HTTP status
    #[error("HTTP {status} for URL: {url}")]
    Status { url: String, status: u16 },

    /// Connection, TLS or timeout failure; retried before surfacing
    #[error("{url}: {reason}")]
    Transport { url: String, reason: String },

    /// Local write failure while storing a download
    #[error("{path}: {reason}")]
    Io { path: String, reason: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

impl From<FetchError> for MlhubError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound { url, .. } => MlhubError::DependencyFileNotFound { location: url },
            FetchError::Status { url, status } => MlhubError::DownloadFailed {
                url,
                reason: format!("HTTP {status}"),
            },
            FetchError::Transport { url, reason } => MlhubError::LocationUnreachable { url, reason },
            FetchError::Io { path, reason } => MlhubError::FileWriteFailed { path, reason },
        }
    }
}

/// Metadata of a completed download
#[derive(Debug, Clone, Default)]
pub struct Download {
    /// Bytes written to the destination
    pub bytes: u64,
    /// Content-Length announced by the server, if any
    pub content_length: Option<u64>,
}

/// Blocking HTTP access used by the resolver and the installer
pub trait Fetch {
    /// GET `url` and return the whole body
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// GET `url` into `dest`, atomically replacing whatever is there
    fn download(&self, url: &str, dest: &Path) -> Result<Download, FetchError>;

    /// Whether `url` answers with a success status.
    ///
    /// `Ok(false)` only for a not-found answer; transport and other status
    /// failures are errors.
    fn exists(&self, url: &str) -> Result<bool, FetchError>;

    /// The `filename` parameter of the `Content-Disposition` response header
    fn suggested_filename(&self, url: &str) -> Result<Option<String>, FetchError>;
}

/// Extract the `filename` parameter from a `Content-Disposition` value.
///
/// `filename*=UTF-8''...` is preferred over a plain `filename=` when both are
/// present.
pub fn parse_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in value.split(';').map(str::trim) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let raw = raw.trim();
        if key == "filename*" {
            let encoded = raw.rsplit("''").next().unwrap_or(raw);
            extended = Some(percent_decode(encoded));
        } else if key == "filename" {
            plain = Some(raw.trim_matches('"').to_string());
        }
    }

    extended
        .or(plain)
        .map(|name| {
            // Never let a server choose a directory
            name.rsplit(['/', '\\']).next().unwrap_or_default().to_string()
        })
        .filter(|name| !name.is_empty())
}

/// Last path segment of a URL, without query or fragment
pub fn url_basename(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    percent_decode(path.rsplit('/').next().unwrap_or_default())
}

/// Decode `%XX` escapes, leaving malformed escapes untouched
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
