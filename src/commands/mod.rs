//! Command implementations for the `ml` CLI
//!
//! Each command resolves settings, builds the real collaborators and hands
//! off to an operation.

pub mod completions;
pub mod configure;
pub mod install;
pub mod installed;
pub mod remove;
pub mod version;

use std::path::Path;

/// Options shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct Globals<'a> {
    pub init_dir: Option<&'a Path>,
    pub quiet: bool,
}
