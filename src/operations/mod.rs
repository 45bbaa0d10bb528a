//! High-level operations behind each command
//!
//! - InstallOperation: resolve a reference, gate on versions, place the package
//! - ConfigureOperation: fetch remote files and report dependencies
//! - RemoveOperation: remove a package and optionally its cache
//! - installed: list what is in the home directory
//!
//! Operations take their collaborators (HTTP, git, prompt) as trait objects
//! so the commands wire in the real ones and tests wire in fakes.

pub mod configure;
pub mod install;
pub mod installed;
pub mod remove;

pub use configure::ConfigureOperation;
pub use install::InstallOperation;
pub use remove::RemoveOperation;
