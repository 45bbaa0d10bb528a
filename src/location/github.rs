//! GitHub: codeload archives, raw.githubusercontent.com content and the
//! contents API

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use super::reference::{join_from, query_param, segments, split_repo};
use super::{Host, Location, ResourceKind, UrlParts, fetch_failure};
use crate::archive::drop_archive_ext;
use crate::error::{MlhubError, Result};
use crate::net::Fetch;

const API_HOST: &str = "api.github.com";

pub struct GitHub;

fn type_unknown(loc: &Location) -> MlhubError {
    MlhubError::DependencyFileTypeUnknown {
        location: loc.reference.clone(),
    }
}

impl Host for GitHub {
    fn domains(&self) -> &'static [&'static str] {
        &["github.com", "githubusercontent.com"]
    }

    fn ssh_host(&self) -> &'static str {
        "github.com"
    }

    fn pull_ref(&self, number: &str) -> String {
        format!("pull/{number}/head")
    }

    fn interpret_url(&self, url: &Url) -> Option<UrlParts> {
        let host = url.host_str()?.to_lowercase();
        let segs = segments(url);

        // api.github.com/repos/<owner>/<repo>/contents/<path>?ref=<ref>
        if host == API_HOST {
            let (owner, repo, rest) = split_repo(segs.get(1..)?)?;
            let path = match rest.first().map(String::as_str) {
                Some("contents") => join_from(rest, 1),
                _ => None,
            };
            return Some(UrlParts {
                owner,
                repo,
                git_ref: query_param(url, "ref"),
                path,
            });
        }

        let (owner, repo, rest) = split_repo(&segs)?;
        let mut parts = UrlParts {
            owner,
            repo,
            ..UrlParts::default()
        };

        // raw.githubusercontent.com/<owner>/<repo>/<ref>/<path>
        // codeload.github.com/<owner>/<repo>/zip/<ref>
        if host.ends_with("githubusercontent.com") {
            parts.git_ref = rest.first().cloned();
            parts.path = join_from(rest, 1);
            return Some(parts);
        }
        if host.starts_with("codeload.") {
            parts.git_ref = join_from(rest, 1);
            return Some(parts);
        }

        match rest.first().map(String::as_str) {
            Some("blob" | "commit" | "raw" | "tree") => {
                parts.git_ref = rest.get(1).cloned();
                parts.path = join_from(rest, 2);
            }
            Some("releases") => {
                parts.git_ref = rest.get(2).cloned();
            }
            Some("archive") => {
                let archive = join_from(rest, 1).unwrap_or_default();
                let archive = drop_archive_ext(&archive);
                let archive = archive
                    .strip_prefix("refs/heads/")
                    .or_else(|| archive.strip_prefix("refs/tags/"))
                    .unwrap_or(archive);
                parts.git_ref = Some(archive.to_string()).filter(|r| !r.is_empty());
            }
            Some("pull") => {
                parts.git_ref = rest.get(1).map(|n| self.pull_ref(n));
            }
            _ => {}
        }
        Some(parts)
    }

    fn repo_zip_url(&self, loc: &Location) -> String {
        format!(
            "https://codeload.github.com/{}/{}/zip/{}",
            loc.owner, loc.repo, loc.git_ref
        )
    }

    fn content_url(&self, loc: &Location, path: &str, api: bool, _tree: bool) -> String {
        // Pull request heads are not served by raw.githubusercontent.com
        if api || loc.git_ref.starts_with("pull/") {
            format!(
                "https://{API_HOST}/repos/{}/{}/contents/{}?ref={}",
                loc.owner, loc.repo, path, loc.git_ref
            )
        } else {
            format!(
                "https://raw.githubusercontent.com/{}/{}/{}/{}",
                loc.owner, loc.repo, loc.git_ref, path
            )
        }
    }

    fn res_type(&self, loc: &Location, fetch: &dyn Fetch) -> Result<(ResourceKind, String)> {
        let api_url = loc.compose_content_url(true, false, "");
        let body = fetch
            .get_bytes(&api_url)
            .map_err(|e| fetch_failure(e, &loc.reference))?;
        let listing: serde_json::Value =
            serde_json::from_slice(&body).map_err(|_| type_unknown(loc))?;

        match listing {
            serde_json::Value::Array(_) => Ok((ResourceKind::Dir, loc.compose_repo_zip_url())),
            serde_json::Value::Object(entry) => {
                let url = if loc.git_ref.starts_with("pull/") {
                    entry
                        .get("download_url")
                        .and_then(serde_json::Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| type_unknown(loc))?
                } else {
                    loc.compose_content_url(false, false, "")
                };
                Ok((ResourceKind::File, url))
            }
            _ => Err(type_unknown(loc)),
        }
    }

    /// The contents API wraps file bytes as base64 in a JSON object
    fn decode_raw(&self, url: &str, bytes: Vec<u8>) -> Result<Vec<u8>> {
        let is_api = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(API_HOST)))
            .unwrap_or(false);
        if !is_api {
            return Ok(bytes);
        }

        let malformed = |reason: String| MlhubError::ManifestMalformed {
            location: url.to_string(),
            reason,
        };
        let envelope: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| malformed(e.to_string()))?;
        let content = envelope
            .get("content")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| malformed("no 'content' field in API response".to_string()))?;
        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map_err(|e| malformed(format!("invalid base64 content: {e}")))
    }
}
