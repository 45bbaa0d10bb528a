//! Progress lines and next-step hints

use std::path::Path;

use console::Style;

/// A follow-up command suggested after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Readme,
    Configure,
    Install,
    Installed,
}

impl NextStep {
    fn describe(self) -> (&'static str, &'static str) {
        match self {
            NextStep::Readme => ("view the package's README", "readme"),
            NextStep::Configure => ("install the package's dependencies", "configure"),
            NextStep::Install => ("install a package", "install"),
            NextStep::Installed => ("list the installed packages", "installed"),
        }
    }

    /// `To <what>:\n\n  $ ml <cmd> <pkg>`
    pub fn suggestion(self, package: Option<&str>) -> String {
        let (what, cmd) = self.describe();
        let argument = match (self, package) {
            (NextStep::Installed, _) => String::new(),
            (_, Some(pkg)) => format!(" {pkg}"),
            (NextStep::Install, None) => " <reference>".to_string(),
            (_, None) => " <package>".to_string(),
        };
        format!("To {what}:\n\n  $ ml {cmd}{argument}")
    }
}

/// Writes user-facing progress to stdout unless quiet
#[derive(Debug, Default, Clone, Copy)]
pub struct Console {
    pub quiet: bool,
}

impl Console {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn line(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    pub fn downloading(&self, url: &str, dest: &Path) {
        self.line(&format!(
            "{} '{}' into '{}' ...",
            Style::new().bold().green().apply_to("Downloading"),
            url,
            dest.display()
        ));
    }

    pub fn cached(&self, path: &Path) {
        self.line(&format!(
            "  {} {}",
            Style::new().dim().apply_to("using cached copy found in"),
            path.display()
        ));
    }

    pub fn extracting(&self, archive: &Path, dest: &Path) {
        self.line(&format!(
            "{} '{}' into '{}' ...",
            Style::new().bold().cyan().apply_to("Extracting"),
            archive.display(),
            dest.display()
        ));
    }

    pub fn moving(&self, from: &str, to: &Path) {
        self.line(&format!(
            "{} '{}' into '{}' ...",
            Style::new().bold().apply_to("Moving"),
            from,
            to.display()
        ));
    }

    pub fn next_steps(&self, steps: &[NextStep], package: Option<&str>) {
        for step in steps {
            self.line(&format!(
                "\n{}",
                Style::new().yellow().apply_to(step.suggestion(package))
            ));
        }
        if !steps.is_empty() {
            self.line("");
        }
    }
}
