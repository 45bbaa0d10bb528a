//! Private-repository fallback
//!
//! When a hosting lookup cannot see a repository (private, or simply not
//! there) the installer clones it over SSH and checks out the requested
//! ref. The clone is hidden behind [`RepoCloner`] so installs can be
//! exercised without a network.

mod auth;
mod error;
#[cfg(test)]
pub mod fake;
mod url;

use std::path::{Path, PathBuf};

use git2::{FetchOptions, RemoteCallbacks, Repository, build::RepoBuilder};
use tracing::debug;

use crate::error::{MlhubError, Result};

pub use error::interpret_git_error;
pub use url::normalize_ssh_url_for_clone;

/// Clones `url` into `dest` and checks out `git_ref`, returning the
/// working tree path
pub trait RepoCloner {
    fn clone_at_ref(
        &self,
        url: &str,
        git_ref: &str,
        dest: &Path,
        identity: Option<&Path>,
    ) -> Result<PathBuf>;
}

/// [`RepoCloner`] backed by libgit2
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCloner;

fn fetch_options(identity: Option<&Path>) -> FetchOptions<'static> {
    let mut callbacks = RemoteCallbacks::new();
    auth::setup_auth_callbacks(&mut callbacks, identity);
    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

impl RepoCloner for GitCloner {
    fn clone_at_ref(
        &self,
        url: &str,
        git_ref: &str,
        dest: &Path,
        identity: Option<&Path>,
    ) -> Result<PathBuf> {
        let clone_failed = |e: git2::Error| MlhubError::GitCloneFailed {
            url: url.to_string(),
            reason: interpret_git_error(&e),
        };

        let url_to_clone = normalize_ssh_url_for_clone(url);
        debug!("Cloning {} into {}", url_to_clone, dest.display());

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options(identity));
        let repo = builder
            .clone(url_to_clone.as_ref(), dest)
            .map_err(clone_failed)?;

        if let Some(refspec) = url::extra_refspec(git_ref) {
            debug!("Fetching {}", refspec);
            let mut remote = repo.find_remote("origin").map_err(clone_failed)?;
            remote
                .fetch(&[refspec.as_str()], Some(&mut fetch_options(identity)), None)
                .map_err(clone_failed)?;
        }

        checkout(&repo, git_ref)?;
        Ok(dest.to_path_buf())
    }
}

/// Resolve a branch, tag, remote branch or commit to a commit
fn resolve_reference<'a>(repo: &'a Repository, refname: &str) -> Result<git2::Commit<'a>> {
    let ref_candidates = [
        format!("refs/remotes/origin/{refname}"),
        format!("refs/tags/{refname}"),
        format!("refs/heads/{refname}"),
        refname.to_string(),
    ];

    for candidate in &ref_candidates {
        if let Ok(commit) = repo
            .find_reference(candidate)
            .and_then(|r| r.peel_to_commit())
        {
            return Ok(commit);
        }
    }

    repo.revparse_single(refname)
        .and_then(|obj| obj.peel_to_commit())
        .map_err(|e| MlhubError::GitCheckoutFailed {
            git_ref: refname.to_string(),
            reason: e.message().to_string(),
        })
}

/// Detach HEAD at `git_ref` and force the working tree to match
fn checkout(repo: &Repository, git_ref: &str) -> Result<()> {
    let checkout_failed = |e: git2::Error| MlhubError::GitCheckoutFailed {
        git_ref: git_ref.to_string(),
        reason: e.message().to_string(),
    };

    let commit = resolve_reference(repo, git_ref)?;
    repo.set_head_detached(commit.id()).map_err(checkout_failed)?;

    let mut checkout_builder = git2::build::CheckoutBuilder::new();
    checkout_builder.force();
    repo.checkout_head(Some(&mut checkout_builder))
        .map_err(checkout_failed)
}
