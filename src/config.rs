use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::catalog::PermitFamily;
use crate::domain::{ArchiveBundle, Region};
use crate::error::MirrorError;
use crate::static_lists;
use crate::temporal::YearMonth;

pub const DEFAULT_CONFIG_FILE: &str = "census-mirror.json";
pub const DEFAULT_TRANSFER_LOG: &str = "census-mirror-transfers.log";
pub const SCHEMA_VERSION: u32 = 1;
/// Permit filenames carry a four-digit year.
pub const MAX_YEAR: u16 = 9999;
/// Directory under `data_root` holding the permit files.
pub const PERMITS_DIR: &str = "bps";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MirrorConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default = "default_data_root")]
    pub data_root: Utf8PathBuf,
    #[serde(default = "default_transfer_log")]
    pub transfer_log: Utf8PathBuf,
    /// Per-transfer timeout. Absent means a transfer may run indefinitely.
    #[serde(default)]
    pub transfer_timeout_secs: Option<u64>,
    #[serde(default)]
    pub permits: PermitsConfig,
    #[serde(default = "Region::census_regions")]
    pub regions: Vec<Region>,
    #[serde(default = "static_lists::default_static_datasets")]
    pub static_datasets: Vec<StaticDataset>,
    #[serde(default = "static_lists::default_archives")]
    pub archives: Vec<ArchiveBundle>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            data_root: default_data_root(),
            transfer_log: default_transfer_log(),
            transfer_timeout_secs: None,
            permits: PermitsConfig::default(),
            regions: Region::census_regions(),
            static_datasets: static_lists::default_static_datasets(),
            archives: static_lists::default_archives(),
        }
    }
}

/// Building Permits Survey parameters. Bump `previous_year` and
/// `latest_month` as new releases appear.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PermitsConfig {
    pub prefix: String,
    pub start_year: u16,
    #[serde(default)]
    pub family_start_years: BTreeMap<PermitFamily, u16>,
    pub previous_year: u16,
    pub latest_month: YearMonth,
    /// Fetch the previous year's December year-to-date files instead of its
    /// annual files. Needed from January until the annual revision lands in May.
    #[serde(default)]
    pub use_previous_december: bool,
}

impl Default for PermitsConfig {
    fn default() -> Self {
        Self {
            prefix: "https://www2.census.gov/econ/bps/".to_string(),
            start_year: 1980,
            family_start_years: BTreeMap::from([(PermitFamily::County, 1990)]),
            previous_year: 2025,
            latest_month: YearMonth {
                year: 2026,
                month: 8,
            },
            use_previous_december: false,
        }
    }
}

impl PermitsConfig {
    pub fn first_year(&self, family: PermitFamily) -> u16 {
        self.family_start_years
            .get(&family)
            .copied()
            .map_or(self.start_year, |year| year.max(self.start_year))
    }

    /// Exclusive upper bound of the annual range.
    pub fn annual_end(&self) -> u16 {
        if self.use_previous_december {
            self.previous_year
        } else {
            self.previous_year.saturating_add(1)
        }
    }

    pub fn monthly_snapshots(&self) -> Vec<YearMonth> {
        let mut snapshots = vec![self.latest_month];
        if self.use_previous_december {
            snapshots.push(YearMonth {
                year: self.previous_year,
                month: 12,
            });
        }
        snapshots
    }
}

/// A hand-maintained list of files sharing one local directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StaticDataset {
    pub name: String,
    pub destination: Utf8PathBuf,
    pub locators: Vec<String>,
}

impl StaticDataset {
    pub fn new(name: &str, destination: &str, locators: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            destination: Utf8PathBuf::from(destination),
            locators,
        }
    }
}

impl MirrorConfig {
    pub fn validate(&self) -> Result<(), MirrorError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(MirrorError::InvalidConfig(format!(
                "unsupported schema_version {}",
                self.schema_version
            )));
        }

        let permits = &self.permits;
        YearMonth::new(permits.latest_month.year, permits.latest_month.month)?;
        if permits.start_year > permits.previous_year {
            return Err(MirrorError::InvalidConfig(format!(
                "start_year {} is after previous_year {}",
                permits.start_year, permits.previous_year
            )));
        }
        if permits.previous_year > MAX_YEAR || permits.latest_month.year > MAX_YEAR {
            return Err(MirrorError::InvalidConfig(format!(
                "permit years must not exceed {MAX_YEAR}"
            )));
        }
        if !permits.prefix.ends_with('/') {
            return Err(MirrorError::InvalidConfig(
                "permits prefix must end with '/'".to_string(),
            ));
        }

        let mut codes = HashSet::new();
        for region in &self.regions {
            if region.code.trim().is_empty() || region.name.trim().is_empty() {
                return Err(MirrorError::InvalidConfig(
                    "region code and name must not be empty".to_string(),
                ));
            }
            if !codes.insert(region.code.as_str()) {
                return Err(MirrorError::InvalidConfig(format!(
                    "duplicate region code {}",
                    region.code
                )));
            }
        }

        for dataset in &self.static_datasets {
            check_mirror_relative(&dataset.destination, &dataset.name)?;
        }

        // Archive roots are filtered after extraction, so nothing else may
        // live inside, above or beside them.
        let mut claimed = vec![Utf8Path::new(PERMITS_DIR)];
        claimed.extend(self.static_datasets.iter().map(|d| d.destination.as_path()));
        for archive in &self.archives {
            if archive.allow_list.is_empty() {
                return Err(MirrorError::InvalidConfig(format!(
                    "archive {} has an empty allow_list",
                    archive.locator
                )));
            }
            let root = archive.extraction_root.as_path();
            check_mirror_relative(root, &archive.locator)?;
            if let Some(other) = claimed
                .iter()
                .find(|other| root.starts_with(other) || other.starts_with(root))
            {
                return Err(MirrorError::InvalidConfig(format!(
                    "archive root {root} overlaps {other}"
                )));
            }
            claimed.push(root);
        }
        Ok(())
    }
}

/// Paths joined onto `data_root` must be non-empty and made only of plain
/// names, so they can never resolve to the root itself or outside it.
fn check_mirror_relative(path: &Utf8Path, owner: &str) -> Result<(), MirrorError> {
    let plain = path
        .components()
        .all(|component| matches!(component, Utf8Component::Normal(_)));
    if path.as_str().trim().is_empty() || !plain {
        return Err(MirrorError::InvalidConfig(format!(
            "{owner}: {path:?} must be a relative path below data_root"
        )));
    }
    Ok(())
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `census-mirror.json` when present, or the built-in
    /// configuration.
    pub fn resolve(path: Option<&str>) -> Result<MirrorConfig, MirrorError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            let config = MirrorConfig::default();
            config.validate()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| MirrorError::ConfigRead(config_path.clone()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<MirrorConfig, MirrorError> {
        let config: MirrorConfig = serde_json::from_str(content)
            .map_err(|err| MirrorError::ConfigParse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_data_root() -> Utf8PathBuf {
    Utf8PathBuf::from("data")
}

fn default_transfer_log() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_TRANSFER_LOG)
}
