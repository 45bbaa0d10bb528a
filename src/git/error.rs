//! Turning git2 errors into short messages

use git2::{Error, ErrorClass};

type ErrorCheck = fn(&str, ErrorClass) -> bool;

const ERROR_CLASSIFICATIONS: &[(ErrorCheck, &str)] = &[
    (
        |msg, _| msg.contains("not found") || msg.contains("404") || msg.contains("too many redirects"),
        "Repository not found",
    ),
    (
        |msg, _| msg.contains("authentication") || msg.contains("credentials"),
        "Authentication failed",
    ),
    (
        |msg, _| msg.contains("permission denied") || msg.contains("access denied"),
        "Permission denied",
    ),
    (
        |msg, _| msg.contains("connection") || msg.contains("timed out") || msg.contains("timeout"),
        "Network error",
    ),
    (
        |msg, class| class == ErrorClass::Http && msg.contains("certificate"),
        "Certificate error",
    ),
];

/// Interpret a git2 error as a user-facing reason
pub fn interpret_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();
    for (check, reason) in ERROR_CLASSIFICATIONS {
        if check(&message, err.class()) {
            return (*reason).to_string();
        }
    }
    match err.class() {
        ErrorClass::Http => format!("HTTP error: {}", err.message()),
        ErrorClass::Ssh => format!("SSH error: {}", err.message()),
        _ => err.message().to_string(),
    }
}
