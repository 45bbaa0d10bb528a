//! Settings and package manifests

pub mod manifest;
pub mod settings;

pub use manifest::{MANIFEST_NAMES, Manifest};
pub use settings::{HttpSettings, Settings};
