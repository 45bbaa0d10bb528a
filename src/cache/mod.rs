//! Per-package directory triad
//!
//! Every package owns three parallel trees under the MLHub home directory:
//!
//! ```text
//! <home>/
//! ├── <pkg>/                 installed package (symlinks into .cache, moved files)
//! ├── .cache/<pkg>/          extracted, ready-to-use dependency content
//! ├── .archive/<pkg>/        raw downloads that had to be unpacked
//! └── .config/<pkg>/         per-package configuration
//! ```
//!
//! Cache and archive entries are keyed by the declared target path, so
//! installing the same manifest twice finds everything already in place.
//! They survive reinstalls of the package; only `remove` offers to delete them.

mod paths;

pub use paths::{PackageDirs, Target, list_installed};
