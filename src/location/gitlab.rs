//! GitLab: `-/archive` zips, `raw/` content and the v4 repository API

use url::Url;

use super::reference::{join_from, query_param, segments, split_repo};
use super::{Host, Location, ResourceKind, UrlParts, encode_component, fetch_failure};
use crate::error::{MlhubError, Result};
use crate::net::Fetch;

const WEB: &str = "https://gitlab.com";

pub struct GitLab;

impl GitLab {
    fn project_api(loc: &Location) -> String {
        format!(
            "{WEB}/api/v4/projects/{}/repository",
            encode_component(&format!("{}/{}", loc.owner, loc.repo))
        )
    }

    /// `api/v4/projects/<owner%2Frepo>/repository/{files/<path>/raw|tree}`
    fn interpret_api(url: &Url, segs: &[String]) -> Option<UrlParts> {
        let project = segs.get(3)?;
        let (owner, repo) = project.split_once('/')?;
        let path = match segs.get(5).map(String::as_str) {
            Some("files") => segs.get(6).cloned(),
            Some("tree") => query_param(url, "path"),
            _ => None,
        };
        Some(UrlParts {
            owner: owner.to_string(),
            repo: repo.to_string(),
            git_ref: query_param(url, "ref"),
            path,
        })
    }
}

impl Host for GitLab {
    fn domains(&self) -> &'static [&'static str] {
        &["gitlab.com"]
    }

    fn ssh_host(&self) -> &'static str {
        "gitlab.com"
    }

    fn pull_ref(&self, number: &str) -> String {
        format!("merge_requests/{number}/head")
    }

    fn interpret_url(&self, url: &Url) -> Option<UrlParts> {
        let segs = segments(url);
        if segs.first().map(String::as_str) == Some("api") {
            return Self::interpret_api(url, &segs);
        }

        let (owner, repo, mut rest) = split_repo(&segs)?;
        if rest.first().map(String::as_str) == Some("-") {
            rest = &rest[1..];
        }

        let mut parts = UrlParts {
            owner,
            repo,
            ..UrlParts::default()
        };
        match rest.first().map(String::as_str) {
            Some("blob" | "commit" | "raw" | "tree") => {
                parts.git_ref = rest.get(1).cloned();
                parts.path = join_from(rest, 2);
            }
            Some("archive") => {
                parts.git_ref = rest.get(1).cloned();
            }
            Some("merge_requests") => {
                parts.git_ref = rest.get(1).map(|n| self.pull_ref(n));
            }
            _ => {}
        }
        Some(parts)
    }

    fn repo_zip_url(&self, loc: &Location) -> String {
        format!(
            "{WEB}/{}/{}/-/archive/{git_ref}/{}-{git_ref}.zip",
            loc.owner,
            loc.repo,
            loc.repo,
            git_ref = loc.git_ref
        )
    }

    fn content_url(&self, loc: &Location, path: &str, api: bool, tree: bool) -> String {
        match (api, tree) {
            (true, false) => format!(
                "{}/files/{}/raw?ref={}",
                Self::project_api(loc),
                encode_component(path),
                loc.git_ref
            ),
            (true, true) => format!(
                "{}/tree?path={}&ref={}",
                Self::project_api(loc),
                encode_component(path),
                loc.git_ref
            ),
            (false, _) => format!("{WEB}/{}/{}/raw/{}/{}", loc.owner, loc.repo, loc.git_ref, path),
        }
    }

    /// A file answers on the files API; otherwise a non-empty tree listing
    /// means a directory
    fn res_type(&self, loc: &Location, fetch: &dyn Fetch) -> Result<(ResourceKind, String)> {
        if fetch.exists(&loc.compose_content_url(true, false, ""))? {
            return Ok((ResourceKind::File, loc.compose_content_url(false, false, "")));
        }

        let body = fetch
            .get_bytes(&loc.compose_content_url(true, true, ""))
            .map_err(|e| fetch_failure(e, &loc.reference))?;
        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(serde_json::Value::Array(items)) if items.is_empty() => {
                Err(MlhubError::DependencyFileNotFound {
                    location: loc.reference.clone(),
                })
            }
            Ok(serde_json::Value::Array(_)) => Ok((ResourceKind::Dir, loc.compose_repo_zip_url())),
            _ => Err(MlhubError::DependencyFileTypeUnknown {
                location: loc.reference.clone(),
            }),
        }
    }
}
