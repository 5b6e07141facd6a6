use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::domain::locator_file_name;
use crate::error::MirrorError;

/// Saves a remote file into a directory under the locator's own filename.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, locator: &str, destination_dir: &Utf8Path) -> Result<Utf8PathBuf, MirrorError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, MirrorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("census-mirror/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MirrorError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| MirrorError::Http(err.to_string()))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, locator: &str, destination_dir: &Utf8Path) -> Result<Utf8PathBuf, MirrorError> {
        let destination = destination_dir.join(locator_file_name(locator)?);
        debug!(url = locator, destination = %destination, "fetch.request");

        let mut response = self
            .client
            .get(locator)
            .send()
            .map_err(|err| MirrorError::Http(format!("{locator}: {err}")))?;
        if !response.status().is_success() {
            return Err(MirrorError::HttpStatus {
                status: response.status().as_u16(),
                url: locator.to_string(),
            });
        }

        let mut temp = tempfile::Builder::new()
            .prefix(".census-mirror")
            .tempfile_in(destination_dir.as_std_path())
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        response
            .copy_to(temp.as_file_mut())
            .map_err(|err| MirrorError::Http(format!("{locator}: {err}")))?;
        temp.persist(destination.as_std_path())
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        Ok(destination)
    }
}

/// Append-only record of every transfer, one line per fetch.
pub struct TransferLog {
    file: Mutex<File>,
}

impl TransferLog {
    /// Truncates `path` and opens it for appending.
    pub fn create(path: &Utf8Path) -> Result<Self, MirrorError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        }
        File::create(path.as_std_path()).map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        let file = OpenOptions::new()
            .append(true)
            .open(path.as_std_path())
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Empties the log for a new run.
    pub fn reset(&self) -> Result<(), MirrorError> {
        self.lock()
            .set_len(0)
            .map_err(|err| MirrorError::Filesystem(err.to_string()))
    }

    pub fn record(&self, locator: &str, outcome: &Result<Utf8PathBuf, MirrorError>) {
        let timestamp = chrono::Utc::now().to_rfc3339();
        let line = match outcome {
            Ok(path) => format!("{timestamp} ok {locator} {path}\n"),
            Err(err) => format!("{timestamp} error {locator} {err}\n"),
        };
        if let Err(err) = self.lock().write_all(line.as_bytes()) {
            tracing::warn!(error = %err, "failed to append to transfer log");
        }
    }

    // A poisoned lock only means another writer panicked mid-line.
    fn lock(&self) -> MutexGuard<'_, File> {
        match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
