use std::fs;

use camino::Utf8Path;
use serde::Serialize;
use tracing::info;

use crate::archive::Extractor;
use crate::catalog::Catalog;
use crate::config::MirrorConfig;
use crate::error::MirrorError;
use crate::fetch::{Fetcher, TransferLog};
use crate::orchestrator::{FetchHandle, FetchOutcome, Orchestrator};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub issued: usize,
    pub succeeded: usize,
    pub failed: Vec<FetchOutcome>,
}

/// Every transfer issued by one run. Dropping it leaves them running.
pub struct RunHandle {
    handles: Vec<FetchHandle>,
    /// Resources that failed before a transfer could start.
    rejected: Vec<FetchOutcome>,
}

impl RunHandle {
    pub fn issued(&self) -> usize {
        self.handles.len() + self.rejected.len()
    }

    pub fn locators(&self) -> Vec<&str> {
        self.handles
            .iter()
            .map(FetchHandle::locator)
            .chain(self.rejected.iter().map(|outcome| outcome.locator.as_str()))
            .collect()
    }

    /// Blocks until every transfer has finished.
    pub fn wait(self) -> RunSummary {
        let issued = self.issued();
        let mut succeeded = 0;
        let mut failed = self.rejected;
        for handle in self.handles {
            let outcome = handle.wait();
            if outcome.is_success() {
                succeeded += 1;
            } else {
                failed.push(outcome);
            }
        }
        info!(issued, succeeded, failed = failed.len(), "phase=Done");
        RunSummary {
            issued,
            succeeded,
            failed,
        }
    }
}

pub struct RunController<F: Fetcher, X: Extractor> {
    config: MirrorConfig,
    orchestrator: Orchestrator<F, X>,
}

impl<F: Fetcher + 'static, X: Extractor + 'static> RunController<F, X> {
    pub fn new(config: MirrorConfig, fetcher: F, extractor: X) -> Result<Self, MirrorError> {
        config.validate()?;
        let log = TransferLog::create(&config.transfer_log)?;
        Ok(Self {
            orchestrator: Orchestrator::new(fetcher, extractor, log),
            config,
        })
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Wipes the mirror root and issues every transfer, family by family.
    /// Returns as soon as everything is issued.
    pub fn run(&self) -> Result<RunHandle, MirrorError> {
        // Derive before wiping so a bad catalog leaves the old mirror alone.
        let plans = Catalog::new(&self.config).plan()?;

        info!(root = %self.config.data_root, "phase=WipeRoot");
        wipe_root(&self.config.data_root)?;
        self.orchestrator.reset_log()?;

        let mut handles = Vec::new();
        let mut rejected = Vec::new();
        for plan in plans {
            info!(family = %plan.name, count = plan.resources.len(), "phase=Dispatch");
            for resource in plan.resources {
                let locator = resource.locator().to_string();
                match self.orchestrator.dispatch(resource) {
                    Ok(handle) => handles.push(handle),
                    Err(err) => rejected.push(self.orchestrator.reject(&locator, err)),
                }
            }
        }
        info!(issued = handles.len(), rejected = rejected.len(), "phase=Idle");
        Ok(RunHandle { handles, rejected })
    }
}

/// Removes and recreates the mirror root.
pub fn wipe_root(root: &Utf8Path) -> Result<(), MirrorError> {
    if root.file_name().is_none() {
        return Err(MirrorError::InvalidConfig(format!(
            "refusing to wipe mirror root {root:?}"
        )));
    }
    if root.as_std_path().exists() {
        fs::remove_dir_all(root.as_std_path())
            .map_err(|err| MirrorError::Filesystem(format!("remove {root}: {err}")))?;
    }
    fs::create_dir_all(root.as_std_path())
        .map_err(|err| MirrorError::Filesystem(format!("create {root}: {err}")))
}
