//! Resolution of package and file references on source hosting services
//!
//! A reference is either a URL on a known host or a compact form:
//!
//! ```text
//! [service[@host]:]owner/repo[@ref|#pull][:path]
//! ```
//!
//! `service` is `github`, `gitlab` or `bitbucket`; a bare `owner/repo` means
//! GitHub. `@host` only changes the host used for SSH clones of private
//! repositories. Each service composes its own archive, raw content and API
//! URLs; see [`github`], [`gitlab`] and [`bitbucket`].

pub mod bitbucket;
pub mod github;
pub mod gitlab;
mod reference;

use url::Url;

use crate::config::MANIFEST_NAMES;
use crate::error::{MlhubError, Result};
use crate::net::{Fetch, FetchError};

pub use reference::{is_repo_ref, is_url};

/// Branch used when a reference names none
pub const DEFAULT_REF: &str = "master";

/// What a location path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Dir,
    Repo,
}

/// Supported hosting services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    GitHub,
    GitLab,
    Bitbucket,
}

/// Owner, repository, ref and path recovered from a service URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    pub owner: String,
    pub repo: String,
    pub git_ref: Option<String>,
    pub path: Option<String>,
}

/// Per-service URL grammar and endpoints
pub trait Host: Sync {
    /// Registrable domains served by this backend
    fn domains(&self) -> &'static [&'static str];

    /// Host used for `git@<host>:owner/repo.git` clones
    fn ssh_host(&self) -> &'static str;

    /// Ref naming the head of pull request `number`
    fn pull_ref(&self, number: &str) -> String;

    /// Recover owner, repo, ref and path from a URL on this service
    fn interpret_url(&self, url: &Url) -> Option<UrlParts>;

    /// URL of the whole repository at `git_ref` as a zip archive
    fn repo_zip_url(&self, loc: &Location) -> String;

    /// URL of `path` in the repository: raw content, or an API endpoint
    /// when `api` is set (a directory listing for `tree`)
    fn content_url(&self, loc: &Location, path: &str, api: bool, tree: bool) -> String;

    /// Decide whether `loc.path` is a file or a directory
    fn res_type(&self, loc: &Location, fetch: &dyn Fetch) -> Result<(ResourceKind, String)>;

    /// Unwrap content served inside an API envelope
    fn decode_raw(&self, url: &str, bytes: Vec<u8>) -> Result<Vec<u8>> {
        let _ = url;
        Ok(bytes)
    }
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::GitHub, Backend::GitLab, Backend::Bitbucket];

    pub fn host(self) -> &'static dyn Host {
        match self {
            Backend::GitHub => &github::GitHub,
            Backend::GitLab => &gitlab::GitLab,
            Backend::Bitbucket => &bitbucket::Bitbucket,
        }
    }

    pub fn service_name(self) -> &'static str {
        match self {
            Backend::GitHub => "github",
            Backend::GitLab => "gitlab",
            Backend::Bitbucket => "bitbucket",
        }
    }

    /// Backend for a `service:` prefix
    pub fn from_service(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|b| b.service_name() == name)
    }

    /// Backend serving `host`, matched on its last two labels
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.to_lowercase();
        let labels: Vec<&str> = host.rsplitn(3, '.').collect();
        if labels.len() < 2 {
            return None;
        }
        let domain = format!("{}.{}", labels[1], labels[0]);
        Self::ALL
            .into_iter()
            .find(|b| b.host().domains().contains(&domain.as_str()))
    }
}

/// A reference resolved to a repository on a hosting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub backend: Backend,
    /// The reference as given
    pub reference: String,
    pub owner: String,
    pub repo: String,
    pub git_ref: String,
    /// Path inside the repository; `None` means the whole repository
    pub path: Option<String>,
    pub ssh_host: String,
}

impl Location {
    /// Resolve a reference, or `None` when it names no known service
    pub fn parse(reference: &str) -> Option<Self> {
        reference::parse(reference)
    }

    pub fn host(&self) -> &'static dyn Host {
        self.backend.host()
    }

    /// URL of the whole repository at `git_ref` as an archive
    pub fn compose_repo_zip_url(&self) -> String {
        self.host().repo_zip_url(self)
    }

    /// URL of the location's path, or of `default` when it has none
    pub fn compose_content_url(&self, api: bool, tree: bool, default: &str) -> String {
        let path = self.path.as_deref().unwrap_or(default);
        self.host().content_url(self, path, api, tree)
    }

    /// Classify the path as file, directory or whole repository and return
    /// the URL to download it from.
    ///
    /// `DependencyFileNotFound` means the service refused to show the path,
    /// which is what a private repository looks like.
    pub fn get_res_type(&self, fetch: &dyn Fetch) -> Result<(ResourceKind, String)> {
        if self.path.is_none() {
            return Ok((ResourceKind::Repo, self.compose_repo_zip_url()));
        }
        self.host().res_type(self, fetch)
    }

    /// URL of the package manifest.
    ///
    /// An explicit path is taken as the manifest itself; otherwise each
    /// manifest name is looked up at the repository root in order.
    pub fn get_pkg_yaml_url(&self, fetch: &dyn Fetch) -> Result<String> {
        if self.path.is_some() {
            return Ok(self.compose_content_url(false, false, ""));
        }
        for name in MANIFEST_NAMES {
            let url = self.compose_content_url(false, false, name);
            if fetch.exists(&url)? {
                return Ok(url);
            }
        }
        Err(MlhubError::ManifestNotFound {
            location: self.reference.clone(),
        })
    }

    /// Content of the location: the reference itself when it is a URL,
    /// otherwise its raw content URL
    pub fn read_raw_file(&self, fetch: &dyn Fetch) -> Result<Vec<u8>> {
        let url = if is_url(&self.reference) {
            self.reference.clone()
        } else {
            self.compose_content_url(false, false, "")
        };
        let bytes = fetch
            .get_bytes(&url)
            .map_err(|e| fetch_failure(e, &url))?;
        self.host().decode_raw(&url, bytes)
    }

    /// `git@<host>:<owner>/<repo>.git`
    pub fn ssh_clone_url(&self) -> String {
        format!("git@{}:{}/{}.git", self.ssh_host, self.owner, self.repo)
    }

    /// Last segment of the path, or the repository name
    pub fn folder_name(&self) -> &str {
        self.path
            .as_deref()
            .and_then(|p| p.rsplit('/').find(|s| !s.is_empty()))
            .unwrap_or(&self.repo)
    }
}

/// Read a file by URL, unwrapping API envelopes of known services
pub fn read_raw_file(fetch: &dyn Fetch, url: &str) -> Result<Vec<u8>> {
    match Location::parse(url) {
        Some(location) => location.read_raw_file(fetch),
        None => fetch.get_bytes(url).map_err(|e| fetch_failure(e, url)),
    }
}

/// Map a fetch failure for `location`, keeping "not found" distinguishable
pub(crate) fn fetch_failure(err: FetchError, location: &str) -> MlhubError {
    match err {
        FetchError::NotFound { .. } => MlhubError::DependencyFileNotFound {
            location: location.to_string(),
        },
        other => other.into(),
    }
}

/// Percent-encode everything outside the unreserved set, including `/`
pub(crate) fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
