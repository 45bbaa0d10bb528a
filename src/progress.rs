//! Progress bar display for downloads

use indicatif::{ProgressBar, ProgressStyle};

/// Byte progress for a single download
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    /// Create a bar sized to `total` bytes, or a spinner when the size is unknown
    pub fn new(total: Option<u64>, name: &str) -> Self {
        let bar = match total {
            Some(total) if total > 0 => {
                let bar = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("      [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                {
                    bar.set_style(style.progress_chars("#>-"));
                }
                bar
            }
            _ => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::default_spinner().template("      {spinner} {bytes} {msg}") {
                    bar.set_style(style);
                }
                bar
            }
        };
        bar.set_message(name.to_string());
        Self { bar }
    }

    pub fn set_position(&self, bytes: u64) {
        self.bar.set_position(bytes);
    }

    /// Remove the bar once the download is over
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
