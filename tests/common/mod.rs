//! Common test utilities for MLHub integration tests

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// An MLHub home directory plus a place to build package archives
#[allow(dead_code)]
pub struct TestHub {
    /// Home directory passed as `--init-dir`
    pub home: TempDir,
    /// Where test archives are written
    pub downloads: TempDir,
}

#[allow(dead_code)]
impl TestHub {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().expect("Failed to create home directory"),
            downloads: TempDir::new().expect("Failed to create downloads directory"),
        }
    }

    /// `ml` bound to this home directory, with MLINIT cleared
    pub fn ml(&self) -> Command {
        let mut cmd = ml_cmd();
        cmd.env_remove("MLINIT")
            .env_remove("MLHUB_LOG")
            .arg("--init-dir")
            .arg(self.home.path());
        cmd
    }

    /// Write a zip archive with the given entries
    pub fn zip(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let path = self.downloads.path().join(name);
        let mut zip = zip::ZipWriter::new(File::create(&path).expect("Failed to create zip"));
        for (entry, content) in files {
            zip.start_file(*entry, SimpleFileOptions::default())
                .expect("Failed to start zip entry");
            zip.write_all(content.as_bytes())
                .expect("Failed to write zip entry");
        }
        zip.finish().expect("Failed to finish zip");
        path
    }

    /// Write a gzip-compressed tarball with the given entries
    pub fn tar_gz(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let path = self.downloads.path().join(name);
        let gz = flate2::write::GzEncoder::new(
            File::create(&path).expect("Failed to create tarball"),
            flate2::Compression::default(),
        );
        let mut tar = tar::Builder::new(gz);
        for (entry, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar.append_data(&mut header, entry, content.as_bytes())
                .expect("Failed to append tar entry");
        }
        tar.into_inner()
            .expect("Failed to finish tar")
            .finish()
            .expect("Failed to finish gzip");
        path
    }

    /// Path of a file inside the home directory
    pub fn path(&self, relative: &str) -> PathBuf {
        self.home.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).expect("Failed to read file")
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }
}

/// Minimal manifest text
#[allow(dead_code)]
pub fn manifest(name: &str, version: &str, extra: &str) -> String {
    format!("meta:\n  name: {name}\n  version: {version}\n  title: {name} model\n{extra}")
}

#[allow(dead_code)]
pub fn arg(path: &Path) -> String {
    path.display().to_string()
}

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn ml_cmd() -> Command {
    Command::cargo_bin("ml").expect("ml binary")
}
