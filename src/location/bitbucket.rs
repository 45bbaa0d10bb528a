//! Bitbucket: `get/<ref>.zip` archives, `raw/` content and the 2.0 `src` API

use url::Url;

use super::reference::{join_from, segments, split_repo};
use super::{Host, Location, ResourceKind, UrlParts, fetch_failure};
use crate::archive::drop_archive_ext;
use crate::error::{MlhubError, Result};
use crate::net::Fetch;

pub struct Bitbucket;

impl Host for Bitbucket {
    fn domains(&self) -> &'static [&'static str] {
        &["bitbucket.org"]
    }

    fn ssh_host(&self) -> &'static str {
        "bitbucket.org"
    }

    fn pull_ref(&self, number: &str) -> String {
        format!("pull-requests/{number}/head")
    }

    fn interpret_url(&self, url: &Url) -> Option<UrlParts> {
        let segs = segments(url);

        // api.bitbucket.org/2.0/repositories/<owner>/<repo>/src/<ref>/<path>
        let segs = if url.host_str().is_some_and(|h| h.starts_with("api.")) {
            segs.get(2..)?.to_vec()
        } else {
            segs
        };

        let (owner, repo, rest) = split_repo(&segs)?;
        let mut parts = UrlParts {
            owner,
            repo,
            ..UrlParts::default()
        };
        match rest.first().map(String::as_str) {
            Some("branch" | "commits" | "raw" | "src") => {
                parts.git_ref = rest.get(1).cloned();
                parts.path = join_from(rest, 2);
            }
            Some("get") => {
                parts.git_ref = rest.get(1).map(|r| drop_archive_ext(r).to_string());
            }
            Some("pull-requests") => {
                parts.git_ref = rest.get(1).map(|n| self.pull_ref(n));
            }
            _ => {}
        }
        Some(parts)
    }

    fn repo_zip_url(&self, loc: &Location) -> String {
        format!(
            "https://bitbucket.org/{}/{}/get/{}.zip",
            loc.owner, loc.repo, loc.git_ref
        )
    }

    fn content_url(&self, loc: &Location, path: &str, api: bool, _tree: bool) -> String {
        if api {
            format!(
                "https://api.bitbucket.org/2.0/repositories/{}/{}/src/{}/{}?format=meta",
                loc.owner, loc.repo, loc.git_ref, path
            )
        } else {
            format!(
                "https://bitbucket.org/{}/{}/raw/{}/{}",
                loc.owner, loc.repo, loc.git_ref, path
            )
        }
    }

    /// The `src` metadata endpoint states the type directly
    fn res_type(&self, loc: &Location, fetch: &dyn Fetch) -> Result<(ResourceKind, String)> {
        let body = fetch
            .get_bytes(&loc.compose_content_url(true, false, ""))
            .map_err(|e| fetch_failure(e, &loc.reference))?;
        let meta: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();

        match meta.get("type").and_then(serde_json::Value::as_str) {
            Some("commit_file") => Ok((ResourceKind::File, loc.compose_content_url(false, false, ""))),
            Some("commit_directory") => Ok((ResourceKind::Dir, loc.compose_repo_zip_url())),
            _ => Err(MlhubError::DependencyFileTypeUnknown {
                location: loc.reference.clone(),
            }),
        }
    }
}
