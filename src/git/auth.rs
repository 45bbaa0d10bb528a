//! Credentials for private clones
//!
//! An explicit identity file (from `--identity` or `ssh_key` in settings)
//! is tried first. After that authentication falls back to the agent, the
//! usual keys in `~/.ssh/` and git credential helpers.

use std::path::{Path, PathBuf};

use git2::{Cred, CredentialType, Error, ErrorClass, RemoteCallbacks};

const DEFAULT_KEYS: [&str; 3] = ["id_ed25519", "id_rsa", "id_ecdsa"];

fn auth_failed(message: &str) -> Error {
    Error::new(git2::ErrorCode::Auth, ErrorClass::Ssh, message)
}

fn key_with_public(username: &str, private_key: &Path) -> Result<Cred, Error> {
    let public_key = PathBuf::from(format!("{}.pub", private_key.display()));
    let public_key = public_key.exists().then_some(public_key);
    Cred::ssh_key(username, public_key.as_deref(), private_key, None)
}

fn try_ssh_credentials(username: &str) -> Result<Cred, Error> {
    let ssh_dir = dirs::home_dir().unwrap_or_default().join(".ssh");
    for key_name in DEFAULT_KEYS {
        let private_key = ssh_dir.join(key_name);
        if !private_key.exists() {
            continue;
        }
        if let Ok(cred) = key_with_public(username, &private_key) {
            return Ok(cred);
        }
    }
    Err(auth_failed("SSH key not found"))
}

fn try_user_pass_credentials(url: &str, username_from_url: Option<&str>) -> Result<Cred, Error> {
    let config = git2::Config::open_default().or_else(|_| git2::Config::new())?;
    if let Ok(cred) = Cred::credential_helper(&config, url, username_from_url) {
        return Ok(cred);
    }
    Cred::userpass_plaintext(username_from_url.unwrap_or("git"), "")
}

/// Install the credential callback on `callbacks`.
///
/// libgit2 calls back repeatedly while a credential is rejected, so an
/// explicit identity is only offered on the first attempt.
pub fn setup_auth_callbacks(callbacks: &mut RemoteCallbacks<'_>, identity: Option<&Path>) {
    let identity = identity.map(Path::to_path_buf);
    let mut attempts = 0_u32;

    callbacks.credentials(move |url, username_from_url, allowed_types| {
        attempts += 1;
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(CredentialType::SSH_KEY) {
            if let Some(key) = identity.as_deref().filter(|_| attempts == 1) {
                return key_with_public(username, key);
            }
            if attempts > DEFAULT_KEYS.len() as u32 + 2 {
                return Err(auth_failed("authentication failed"));
            }
            return Cred::ssh_key_from_agent(username).or_else(|_| try_ssh_credentials(username));
        }

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return try_user_pass_credentials(url, username_from_url);
        }

        if allowed_types.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }

        Err(auth_failed("authentication failed"))
    });
}
