//! Parsing of compact references and service URLs

use url::Url;

use super::{Backend, DEFAULT_REF, Location, UrlParts};

/// Whether `name` is an HTTP(S) URL
pub fn is_url(name: &str) -> bool {
    let lower = name.trim_start().to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether `name` is a URL on a supported hosting service
pub fn is_repo_url(name: &str) -> bool {
    is_url(name)
        && Url::parse(name)
            .ok()
            .and_then(|u| u.host_str().and_then(Backend::from_host))
            .is_some()
}

/// Whether `name` is a compact hosting reference rather than a plain path.
///
/// `owner/repo` alone is ambiguous with a relative path, so a reference
/// without a service prefix needs one of `@`, `#` or `:`.
pub fn is_repo_ref(name: &str) -> bool {
    if is_url(name) {
        return false;
    }
    let lower = name.to_lowercase();
    let head = lower.split(':').next().unwrap_or_default();
    if head.contains('/') {
        name.contains([':', '@', '#'])
    } else {
        let service = head.split('@').next().unwrap_or_default();
        Backend::from_service(service).is_some() && name.contains(':')
    }
}

/// Split an optional `service:` or `service@host:` prefix off a reference
fn strip_service_prefix(reference: &str) -> (Option<Backend>, Option<String>, &str) {
    for backend in Backend::ALL {
        let service = backend.service_name();
        let Some(head) = reference.get(..service.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(service) {
            continue;
        }
        let rest = &reference[service.len()..];
        if let Some(after) = rest.strip_prefix(':') {
            return (Some(backend), None, after);
        }
        if let Some(after) = rest.strip_prefix('@')
            && let Some((host, remainder)) = after.split_once(':')
        {
            return (Some(backend), Some(host.to_string()), remainder);
        }
    }
    (None, None, reference)
}

fn normalize_path(path: Option<&str>) -> Option<String> {
    path.map(|p| p.trim_matches('/').to_string())
        .filter(|p| !p.is_empty())
}

fn strip_git_suffix(repo: &str) -> &str {
    repo.strip_suffix(".git").unwrap_or(repo)
}

/// `owner/repo[@ref|#pull][:path]`
fn interpret_compact(backend: Backend, compact: &str) -> Option<UrlParts> {
    let (repo_part, path) = match compact.split_once(':') {
        Some((repo_part, path)) => (repo_part, Some(path)),
        None => (compact, None),
    };
    let (owner, repo_ref) = repo_part.split_once('/')?;

    let (repo, git_ref) = if let Some((repo, git_ref)) = repo_ref.split_once('@') {
        (repo, Some(git_ref.to_string()))
    } else if let Some((repo, pull)) = repo_ref.split_once('#') {
        (repo, Some(backend.host().pull_ref(pull)))
    } else {
        (repo_ref, None)
    };

    Some(UrlParts {
        owner: owner.to_string(),
        repo: strip_git_suffix(repo).to_string(),
        git_ref: git_ref.filter(|r| !r.is_empty()),
        path: path.map(str::to_string),
    })
}

pub(super) fn parse(reference: &str) -> Option<Location> {
    let trimmed = reference.trim();
    let (service, custom_host, rest) = strip_service_prefix(trimmed);

    let (backend, parts) = if is_url(rest) {
        let url = Url::parse(rest).ok()?;
        let backend = Backend::from_host(url.host_str()?)?;
        (backend, backend.host().interpret_url(&url)?)
    } else {
        let backend = match service {
            Some(backend) => backend,
            None if rest.split(':').next().is_some_and(|h| h.contains('/')) => Backend::GitHub,
            None => return None,
        };
        (backend, interpret_compact(backend, rest)?)
    };

    if parts.owner.is_empty() || parts.repo.is_empty() {
        return None;
    }

    Some(Location {
        backend,
        reference: rest.to_string(),
        owner: parts.owner,
        repo: parts.repo,
        git_ref: parts.git_ref.unwrap_or_else(|| DEFAULT_REF.to_string()),
        path: normalize_path(parts.path.as_deref()),
        ssh_host: custom_host.unwrap_or_else(|| backend.host().ssh_host().to_string()),
    })
}

/// Non-empty path segments of a URL
pub(super) fn segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segs| {
            segs.filter(|s| !s.is_empty())
                .map(crate::net::percent_decode)
                .collect()
        })
        .unwrap_or_default()
}

/// Value of a query parameter
pub(super) fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// `owner`, `repo` and the remaining segments, with `.git` stripped
pub(super) fn split_repo(segments: &[String]) -> Option<(String, String, &[String])> {
    let owner = segments.first()?;
    let repo = segments.get(1)?;
    Some((
        owner.clone(),
        strip_git_suffix(repo).to_string(),
        &segments[2..],
    ))
}

/// Join the segments from `start` as a path, `None` when there are none
pub(super) fn join_from(segments: &[String], start: usize) -> Option<String> {
    segments
        .get(start..)
        .filter(|rest| !rest.is_empty())
        .map(|rest| rest.join("/"))
}
