//! Blocking reqwest client with retry and atomic downloads

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_DISPOSITION;
use tracing::{debug, warn};

use super::{Download, Fetch, FetchError, parse_content_disposition};
use crate::config::HttpSettings;
use crate::error::{MlhubError, Result};
use crate::progress::DownloadProgress;

/// Delay unit between attempts; attempt `n` waits `n` units
const RETRY_DELAY_MS: u64 = 1000;

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// HTTP client wrapper with timeouts and retry on transport failures
pub struct HttpClient {
    client: Client,
    retries: u32,
    show_progress: bool,
}

impl HttpClient {
    pub fn new(settings: &HttpSettings, show_progress: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| MlhubError::IoError {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            retries: settings.retries,
            show_progress,
        })
    }

    /// Total tries for one request: the first plus `retries` more
    fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Send a GET, retrying transport failures with a linear back-off.
    ///
    /// HTTP error statuses are answers, not failures, and are never retried.
    fn send(&self, url: &str) -> std::result::Result<Response, FetchError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("GET {} (attempt {})", url, attempt);
            match self.client.get(url).send() {
                Ok(response) => return check_status(url, response),
                Err(e) => {
                    if attempt >= self.attempts() {
                        return Err(FetchError::Transport {
                            url: url.to_string(),
                            reason: format!("failed after {attempt} attempts: {e}"),
                        });
                    }
                    warn!("Request to {} failed: {}, retrying...", url, e);
                    std::thread::sleep(Duration::from_millis(
                        RETRY_DELAY_MS * u64::from(attempt),
                    ));
                }
            }
        }
    }
}

fn check_status(url: &str, response: Response) -> std::result::Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let code = status.as_u16();
    match status {
        StatusCode::NOT_FOUND
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::GONE => Err(FetchError::NotFound {
            url: url.to_string(),
            status: code,
        }),
        _ => Err(FetchError::Status {
            url: url.to_string(),
            status: code,
        }),
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

fn io_error(path: &Path, e: &std::io::Error) -> FetchError {
    FetchError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

impl Fetch for HttpClient {
    fn get_bytes(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self.send(url)?;
        let bytes = response.bytes().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: format!("failed to read response: {e}"),
        })?;
        Ok(bytes.to_vec())
    }

    fn download(&self, url: &str, dest: &Path) -> std::result::Result<Download, FetchError> {
        let mut response = self.send(url)?;
        let content_length = response.content_length();

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }

        let part = part_path(dest);
        let mut file = File::create(&part).map_err(|e| io_error(&part, &e))?;

        let display_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| url.to_string());
        let progress = self
            .show_progress
            .then(|| DownloadProgress::new(content_length, &display_name));

        let mut written: u64 = 0;
        let mut buffer = [0u8; STREAM_BUFFER_SIZE];
        let streamed = loop {
            let read = match response.read(&mut buffer) {
                Ok(0) => break Ok(()),
                Ok(n) => n,
                Err(e) => {
                    break Err(FetchError::Transport {
                        url: url.to_string(),
                        reason: format!("failed to read response: {e}"),
                    });
                }
            };
            if let Err(e) = file.write_all(&buffer[..read]) {
                break Err(io_error(&part, &e));
            }
            written += read as u64;
            if let Some(progress) = &progress {
                progress.set_position(written);
            }
        };

        if let Some(progress) = progress {
            progress.finish();
        }

        if let Err(e) = streamed.and_then(|()| file.flush().map_err(|e| io_error(&part, &e))) {
            drop(file);
            let _ = fs::remove_file(&part);
            return Err(e);
        }
        drop(file);

        if let Some(expected) = content_length
            && expected != written
        {
            let _ = fs::remove_file(&part);
            return Err(FetchError::Transport {
                url: url.to_string(),
                reason: format!("truncated body: expected {expected} bytes, got {written}"),
            });
        }

        fs::rename(&part, dest).map_err(|e| io_error(dest, &e))?;
        debug!("Downloaded {} bytes from {} to {}", written, url, dest.display());

        Ok(Download {
            bytes: written,
            content_length,
        })
    }

    fn exists(&self, url: &str) -> std::result::Result<bool, FetchError> {
        match self.send(url) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => {
                debug!("Nothing at {}: {}", url, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn suggested_filename(
        &self,
        url: &str,
    ) -> std::result::Result<Option<String>, FetchError> {
        let response = self.send(url)?;
        Ok(response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_disposition))
    }
}
