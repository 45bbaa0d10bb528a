//! Installed operation: what is in the MLHub home directory

use std::path::Path;

use console::Style;

use crate::cache::list_installed;
use crate::config::Manifest;
use crate::error::Result;
use crate::ui::{Console, NextStep};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledReport {
    pub packages: Vec<InstalledPackage>,
    /// Directories without a readable manifest
    pub broken: Vec<String>,
}

/// Read every installed package's manifest
pub fn scan(home: &Path) -> Result<InstalledReport> {
    let mut report = InstalledReport::default();
    for name in list_installed(home)? {
        match Manifest::load_from_dir(&home.join(&name)) {
            Ok(manifest) => report.packages.push(InstalledPackage {
                name,
                version: manifest.meta.version,
                title: manifest.meta.title.or(manifest.meta.description),
            }),
            Err(err) => {
                tracing::debug!("'{}' is broken: {}", name, err);
                report.broken.push(name);
            }
        }
    }
    Ok(report)
}

/// Print the installed packages, one line each
pub fn print(home: &Path, report: &InstalledReport, console: Console) {
    let count = report.packages.len();
    console.line(&format!(
        "Found {count} package{} installed in '{}'.",
        if count == 1 { "" } else { "s" },
        home.display()
    ));
    if count > 0 {
        console.line("");
    }

    let width = report
        .packages
        .iter()
        .map(|p| p.name.len() + p.version.len() + 1)
        .max()
        .unwrap_or_default();
    for pkg in &report.packages {
        let label = format!("{}:{}", pkg.name, pkg.version);
        console.line(&format!(
            "{}{} {}",
            Style::new().bold().apply_to(&label),
            " ".repeat(width - label.len()),
            pkg.title.as_deref().unwrap_or_default()
        ));
    }

    if !report.broken.is_empty() {
        console.line(&format!(
            "\nBroken (no readable manifest): {}",
            Style::new().red().apply_to(report.broken.join(", "))
        ));
    }

    let next = if count > 0 {
        NextStep::Readme
    } else {
        NextStep::Install
    };
    console.next_steps(&[next], None);
}
