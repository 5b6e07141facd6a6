use std::fs;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::{debug, warn};

use crate::archive::{Extractor, acquire_archive};
use crate::domain::{ArchiveBundle, Resource, ResourceDescriptor};
use crate::error::MirrorError;
use crate::fetch::{Fetcher, TransferLog};

#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub locator: String,
    pub path: Option<String>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A transfer in flight. Dropping it detaches the transfer.
pub struct FetchHandle {
    locator: String,
    handle: JoinHandle<Result<Utf8PathBuf, MirrorError>>,
}

impl FetchHandle {
    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<Utf8PathBuf, MirrorError> {
        self.handle.join().unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(MirrorError::TaskPanicked(message))
        })
    }

    pub fn wait(self) -> FetchOutcome {
        let locator = self.locator.clone();
        match self.join() {
            Ok(path) => FetchOutcome {
                locator,
                path: Some(path.to_string()),
                error: None,
            },
            Err(err) => FetchOutcome {
                locator,
                path: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Issues one independent transfer thread per resource. Nothing is awaited
/// unless the caller joins the returned handles.
pub struct Orchestrator<F: Fetcher, X: Extractor> {
    fetcher: Arc<F>,
    extractor: Arc<X>,
    log: Arc<TransferLog>,
}

impl<F: Fetcher + 'static, X: Extractor + 'static> Orchestrator<F, X> {
    pub fn new(fetcher: F, extractor: X, log: TransferLog) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            log: Arc::new(log),
        }
    }

    pub fn reset_log(&self) -> Result<(), MirrorError> {
        self.log.reset()
    }

    pub fn enqueue(&self, resource: ResourceDescriptor) -> Result<FetchHandle, MirrorError> {
        fs::create_dir_all(resource.destination().as_std_path())
            .map_err(|err| MirrorError::Filesystem(format!("{}: {err}", resource.destination())))?;

        let fetcher = Arc::clone(&self.fetcher);
        let log = Arc::clone(&self.log);
        let locator = resource.locator().to_string();
        debug!(url = %locator, destination = %resource.destination(), "enqueue");

        let handle = thread::spawn(move || {
            let outcome = fetcher.fetch(resource.locator(), resource.destination());
            log.record(resource.locator(), &outcome);
            if let Err(err) = &outcome {
                warn!(url = %resource.locator(), error = %err, "fetch failed");
            }
            outcome
        });
        Ok(FetchHandle { locator, handle })
    }

    /// The bundle's fetch, extract and filter steps run in order on their own
    /// thread, concurrently with everything else.
    pub fn enqueue_archive(&self, bundle: ArchiveBundle) -> Result<FetchHandle, MirrorError> {
        fs::create_dir_all(bundle.extraction_root.as_std_path())
            .map_err(|err| MirrorError::Filesystem(format!("{}: {err}", bundle.extraction_root)))?;

        let fetcher = Arc::clone(&self.fetcher);
        let extractor = Arc::clone(&self.extractor);
        let log = Arc::clone(&self.log);
        let locator = bundle.locator.clone();
        debug!(url = %locator, destination = %bundle.extraction_root, "enqueue archive");

        let handle = thread::spawn(move || {
            let outcome = acquire_archive(&*fetcher, &*extractor, &bundle);
            log.record(&bundle.locator, &outcome);
            if let Err(err) = &outcome {
                warn!(url = %bundle.locator, error = %err, "archive acquisition failed");
            }
            outcome
        });
        Ok(FetchHandle { locator, handle })
    }

    /// Logs a resource that could not be issued and returns its failed outcome.
    pub fn reject(&self, locator: &str, err: MirrorError) -> FetchOutcome {
        warn!(url = %locator, error = %err, "dispatch failed");
        let outcome = Err(err);
        self.log.record(locator, &outcome);
        FetchOutcome {
            locator: locator.to_string(),
            path: None,
            error: outcome.err().map(|err| err.to_string()),
        }
    }

    pub fn dispatch(&self, resource: Resource) -> Result<FetchHandle, MirrorError> {
        match resource {
            Resource::File(descriptor) => self.enqueue(descriptor),
            Resource::Archive(bundle) => self.enqueue_archive(bundle),
        }
    }
}
