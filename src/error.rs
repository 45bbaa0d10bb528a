//! Error types and handling for MLHub
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for MLHub operations
#[derive(Error, Diagnostic, Debug)]
pub enum MlhubError {
    // Package reference errors
    #[error("Malformed package file name: {name}")]
    #[diagnostic(
        code(mlhub::reference::malformed_name),
        help("Package archives must be named <name>_<version>.mlm, e.g. audit_1.2.3.mlm")
    )]
    MalformedPackageFileName { name: String },

    #[error("Cannot tell what package '{reference}' refers to")]
    #[diagnostic(
        code(mlhub::reference::unknown),
        help("Give a package archive (path or URL), or a repository such as owner/repo[@ref][:path]")
    )]
    UnknownReference { reference: String },

    #[error("Invalid package name '{name}'")]
    #[diagnostic(
        code(mlhub::reference::invalid_name),
        help("Package names are a single path component that does not start with '.'")
    )]
    InvalidPackageName { name: String },

    #[error("Unknown shell '{shell}'")]
    #[diagnostic(
        code(mlhub::cli::unknown_shell),
        help("Supported shells: bash, elvish, fish, powershell (pwsh), zsh")
    )]
    UnknownShell { shell: String },

    #[error("Unable to determine the archive type of '{name}'")]
    #[diagnostic(
        code(mlhub::reference::unknown_archive),
        help("Supported archives: .zip, .mlm, .aipk, .tar, .tar.gz, .tgz")
    )]
    UnsupportedArchive { name: String },

    // Manifest errors
    #[error("No MLHUB.yaml, DESCRIPTION.yaml or DESCRIPTION.yml found at: {location}")]
    #[diagnostic(
        code(mlhub::manifest::not_found),
        help("Check the package reference, or whether the repository is private")
    )]
    ManifestNotFound { location: String },

    #[error("Malformed manifest: {location}: {reason}")]
    #[diagnostic(code(mlhub::manifest::malformed))]
    ManifestMalformed { location: String, reason: String },

    // Location errors
    #[error("Unable to reach '{url}': {reason}")]
    #[diagnostic(
        code(mlhub::location::unreachable),
        help("Check your network connection, or retry with a longer http.timeout_secs")
    )]
    LocationUnreachable { url: String, reason: String },

    #[error("Failed to download '{url}': {reason}")]
    #[diagnostic(code(mlhub::location::download_failed))]
    DownloadFailed { url: String, reason: String },

    // Dependency errors
    #[error("Dependency file not found: {location}")]
    #[diagnostic(
        code(mlhub::deps::file_not_found),
        help("Please notify the package author")
    )]
    DependencyFileNotFound { location: String },

    #[error("Unable to tell whether '{location}' is a file or a directory")]
    #[diagnostic(code(mlhub::deps::file_type_unknown))]
    DependencyFileTypeUnknown { location: String },

    #[error("File '{location}' listed in the manifest is missing from the package archive")]
    #[diagnostic(
        code(mlhub::deps::package_file_missing),
        help("The package archive is inconsistent with its own manifest. Please notify the package author")
    )]
    PackageFileMissing { location: String },

    #[error("Unsupported script extension: '{extension}'")]
    #[diagnostic(
        code(mlhub::deps::unsupported_script),
        help("Supported scripts: .sh, .R, .py")
    )]
    UnsupportedScriptExtension { extension: String },

    // Package state errors
    #[error("Package '{name}' is not installed")]
    #[diagnostic(
        code(mlhub::package::not_installed),
        help("Run 'ml installed' to list the installed packages")
    )]
    PackageNotInstalled { name: String },

    #[error("Invalid version '{version}': {reason}")]
    #[diagnostic(
        code(mlhub::package::invalid_version),
        help("Versions must be dotted numbers such as 1.2.10")
    )]
    InvalidVersion { version: String, reason: String },

    // Archive errors
    #[error("Failed to extract archive '{path}': {reason}")]
    #[diagnostic(code(mlhub::archive::extract_failed))]
    ArchiveFailed { path: String, reason: String },

    // Git errors
    #[error("Failed to clone repository: {url}")]
    #[diagnostic(
        code(mlhub::git::clone_failed),
        help("Check that the URL is correct and that your SSH key (-i) has access")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to checkout '{git_ref}': {reason}")]
    #[diagnostic(code(mlhub::git::checkout_failed))]
    GitCheckoutFailed { git_ref: String, reason: String },

    // Configuration errors
    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(mlhub::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Could not determine the MLHub home directory")]
    #[diagnostic(
        code(mlhub::config::no_home),
        help("Set MLINIT or pass --init-dir")
    )]
    NoHomeDirectory,

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(mlhub::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(mlhub::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(mlhub::fs::io_error))]
    IoError { message: String },

    #[error("Failed to read confirmation: {message}")]
    #[diagnostic(code(mlhub::ui::prompt_failed))]
    PromptFailed { message: String },
}

impl From<std::io::Error> for MlhubError {
    fn from(err: std::io::Error) -> Self {
        MlhubError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for MlhubError {
    fn from(err: serde_yaml::Error) -> Self {
        MlhubError::ManifestMalformed {
            location: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MlhubError {
    fn from(err: serde_json::Error) -> Self {
        MlhubError::ManifestMalformed {
            location: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for MlhubError {
    fn from(err: git2::Error) -> Self {
        MlhubError::GitCloneFailed {
            url: "unknown".to_string(),
            reason: err.message().to_string(),
        }
    }
}

impl From<zip::result::ZipError> for MlhubError {
    fn from(err: zip::result::ZipError) -> Self {
        MlhubError::ArchiveFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for MlhubError {
    fn from(err: inquire::InquireError) -> Self {
        MlhubError::PromptFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, MlhubError>;
