//! Clone URL normalization for libgit2

use std::borrow::Cow;

/// Normalize SCP-style SSH URLs (`git@host:owner/repo`) to `ssh://` form.
///
/// libgit2 is more reliable with the explicit scheme.
pub fn normalize_ssh_url_for_clone(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }

    match url.split_once(':') {
        Some((host_part, path_part)) => {
            let path = path_part.trim_start_matches('/');
            Cow::Owned(format!("ssh://{host_part}/{path}"))
        }
        None => Cow::Borrowed(url),
    }
}

/// Fetch refspec for refs that a plain clone does not bring along,
/// such as `pull/12/head` or `merge_requests/4/head`
pub fn extra_refspec(git_ref: &str) -> Option<String> {
    git_ref
        .contains('/')
        .then(|| format!("+refs/{git_ref}:refs/remotes/origin/{git_ref}"))
}
