//! Derives every remote file the mirror needs from a [`MirrorConfig`].
//!
//! Nothing here touches the filesystem or network. The orchestrator consumes
//! the [`FamilyPlan`]s in the order [`Catalog::plan`] returns them.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::config::{MirrorConfig, PERMITS_DIR, StaticDataset};
use crate::domain::{Region, Resource, ResourceDescriptor};
use crate::error::MirrorError;
use crate::temporal::TemporalToken;

/// Building Permits Survey geography levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermitFamily {
    Place,
    County,
    Metro,
    State,
}

impl PermitFamily {
    pub const ALL: [PermitFamily; 4] = [
        PermitFamily::Place,
        PermitFamily::County,
        PermitFamily::Metro,
        PermitFamily::State,
    ];

    pub fn is_region_scoped(self) -> bool {
        matches!(self, PermitFamily::Place)
    }

    /// Path relative to the BPS prefix, e.g. `County/co1990a.txt`. Place
    /// files only exist per region.
    pub fn relative_path(
        self,
        token: TemporalToken,
        region: Option<&Region>,
    ) -> Result<String, MirrorError> {
        let path = match (self, region) {
            (PermitFamily::Place, Some(region)) => {
                format!("Place/{}/{}{token}.txt", region.name, region.code)
            }
            (PermitFamily::Place, None) => return Err(MirrorError::RegionRequired(self.to_string())),
            (PermitFamily::County, _) => format!("County/co{token}.txt"),
            (PermitFamily::Metro, _) => format!("Metro/ma{token}.txt"),
            (PermitFamily::State, _) => format!("State/st{token}.txt"),
        };
        Ok(path)
    }
}

impl fmt::Display for PermitFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermitFamily::Place => write!(f, "place"),
            PermitFamily::County => write!(f, "county"),
            PermitFamily::Metro => write!(f, "metro"),
            PermitFamily::State => write!(f, "state"),
        }
    }
}

/// Resources of one dataset family, dispatched together.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyPlan {
    pub name: String,
    pub resources: Vec<Resource>,
}

pub struct Catalog<'a> {
    config: &'a MirrorConfig,
}

impl<'a> Catalog<'a> {
    pub fn new(config: &'a MirrorConfig) -> Self {
        Self { config }
    }

    /// Annual tokens first, then the year-to-date snapshots, each honoring the
    /// family's first available year.
    pub fn permit_tokens(&self, family: PermitFamily) -> Result<Vec<TemporalToken>, MirrorError> {
        let permits = &self.config.permits;
        let first_year = permits.first_year(family);

        let mut tokens = (first_year..permits.annual_end())
            .map(TemporalToken::Annual)
            .collect::<Vec<_>>();
        for snapshot in permits.monthly_snapshots() {
            let token = TemporalToken::year_to_date(snapshot.year, snapshot.month)?;
            if token.year() >= first_year {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }

    pub fn permit_family(&self, family: PermitFamily) -> Result<Vec<ResourceDescriptor>, MirrorError> {
        let permits = &self.config.permits;
        let local_root = self.config.data_root.join(PERMITS_DIR);
        let mut descriptors = Vec::new();

        for token in self.permit_tokens(family)? {
            let paths = if family.is_region_scoped() {
                self.config
                    .regions
                    .iter()
                    .map(|region| family.relative_path(token, Some(region)))
                    .collect::<Result<Vec<_>, _>>()?
            } else {
                vec![family.relative_path(token, None)?]
            };
            for path in paths {
                descriptors.push(ResourceDescriptor::new(
                    format!("{}{path}", permits.prefix),
                    parent_dir(&local_root, &path),
                ));
            }
        }
        Ok(descriptors)
    }

    pub fn static_dataset(&self, dataset: &StaticDataset) -> Vec<ResourceDescriptor> {
        let destination = self.config.data_root.join(&dataset.destination);
        dataset
            .locators
            .iter()
            .map(|locator| ResourceDescriptor::new(locator.clone(), destination.clone()))
            .collect()
    }

    /// Every family in dispatch order: permits, static lists, archives.
    pub fn plan(&self) -> Result<Vec<FamilyPlan>, MirrorError> {
        let mut plans = Vec::new();

        for family in PermitFamily::ALL {
            let resources = self
                .permit_family(family)?
                .into_iter()
                .map(Resource::File)
                .collect();
            plans.push(FamilyPlan {
                name: format!("permits-{family}"),
                resources,
            });
        }

        for dataset in &self.config.static_datasets {
            let resources = self
                .static_dataset(dataset)
                .into_iter()
                .map(Resource::File)
                .collect();
            plans.push(FamilyPlan {
                name: dataset.name.clone(),
                resources,
            });
        }

        if !self.config.archives.is_empty() {
            let resources = self
                .config
                .archives
                .iter()
                .map(|bundle| {
                    let mut bundle = bundle.clone();
                    bundle.extraction_root = self.config.data_root.join(&bundle.extraction_root);
                    Resource::Archive(bundle)
                })
                .collect();
            plans.push(FamilyPlan {
                name: "archives".to_string(),
                resources,
            });
        }

        Ok(plans)
    }
}

fn parent_dir(root: &Utf8Path, relative: &str) -> Utf8PathBuf {
    let full = root.join(relative);
    full.parent().map(|parent| parent.to_path_buf()).unwrap_or(full)
}
