//! Completeness check for a finished mirror. A run reports success once
//! transfers are issued, so missing files only show up here.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::MirrorConfig;
use crate::domain::Resource;
use crate::error::MirrorError;

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub expected: usize,
    pub present: usize,
    pub missing: Vec<MissingEntry>,
}

impl VerifyReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingEntry {
    pub family: String,
    pub locator: String,
    pub path: String,
}

pub fn verify_mirror(config: &MirrorConfig) -> Result<VerifyReport, MirrorError> {
    let plans = Catalog::new(config).plan()?;
    let mut expected = 0;
    let mut present = 0;
    let mut missing = Vec::new();

    for plan in plans {
        for resource in &plan.resources {
            let paths = match resource {
                Resource::File(descriptor) => vec![descriptor.local_path()?],
                Resource::Archive(bundle) => bundle
                    .allow_list
                    .iter()
                    .map(|name| bundle.extraction_root.join(name))
                    .collect(),
            };
            for path in paths {
                expected += 1;
                if path.as_std_path().is_file() {
                    present += 1;
                } else {
                    missing.push(MissingEntry {
                        family: plan.name.clone(),
                        locator: resource.locator().to_string(),
                        path: path.to_string(),
                    });
                }
            }
        }
    }

    Ok(VerifyReport {
        expected,
        present,
        missing,
    })
}
