use std::fmt;

use camino::Utf8PathBuf;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::MirrorError;

/// Census region. `name` is used verbatim as a remote path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
}

impl Region {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    pub fn census_regions() -> Vec<Region> {
        vec![
            Region::new("so", "South Region"),
            Region::new("ne", "Northeast Region"),
            Region::new("we", "West Region"),
            Region::new("mw", "Midwest Region"),
        ]
    }
}

/// One remote file and the local directory it is saved into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceDescriptor {
    locator: String,
    destination: Utf8PathBuf,
}

impl ResourceDescriptor {
    pub fn new(locator: impl Into<String>, destination: impl Into<Utf8PathBuf>) -> Self {
        Self {
            locator: locator.into(),
            destination: destination.into(),
        }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn destination(&self) -> &Utf8PathBuf {
        &self.destination
    }

    pub fn file_name(&self) -> Result<String, MirrorError> {
        locator_file_name(&self.locator)
    }

    /// Where the file lands once fetched.
    pub fn local_path(&self) -> Result<Utf8PathBuf, MirrorError> {
        Ok(self.destination.join(self.file_name()?))
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.locator, self.destination)
    }
}

/// Zip bundle whose extracted contents are cut down to `allow_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveBundle {
    pub locator: String,
    pub extraction_root: Utf8PathBuf,
    pub allow_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resource {
    File(ResourceDescriptor),
    Archive(ArchiveBundle),
}

impl Resource {
    pub fn locator(&self) -> &str {
        match self {
            Resource::File(descriptor) => descriptor.locator(),
            Resource::Archive(bundle) => &bundle.locator,
        }
    }
}

/// Last path segment of a URL, used as the saved filename.
pub fn locator_file_name(locator: &str) -> Result<String, MirrorError> {
    let url = Url::parse(locator)
        .map_err(|err| MirrorError::InvalidLocator(format!("{locator}: {err}")))?;
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
        .ok_or_else(|| MirrorError::InvalidLocator(format!("{locator}: no file name")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn file_name_from_locator() {
        let name =
            locator_file_name("https://www2.census.gov/econ/bps/Place/South%20Region/so1980a.txt")
                .unwrap();
        assert_eq!(name, "so1980a.txt");
    }

    #[test]
    fn file_name_requires_trailing_segment() {
        assert_matches!(
            locator_file_name("https://www2.census.gov/econ/bps/"),
            Err(MirrorError::InvalidLocator(_))
        );
        assert_matches!(
            locator_file_name("not a url"),
            Err(MirrorError::InvalidLocator(_))
        );
    }

    #[test]
    fn descriptor_local_path() {
        let descriptor = ResourceDescriptor::new(
            "https://www2.census.gov/econ/bps/County/co1990a.txt",
            "data/bps/County",
        );
        assert_eq!(
            descriptor.local_path().unwrap(),
            Utf8PathBuf::from("data/bps/County/co1990a.txt")
        );
    }

    #[test]
    fn four_census_regions() {
        let regions = Region::census_regions();
        let codes = regions.iter().map(|r| r.code.as_str()).collect::<Vec<_>>();
        assert_eq!(codes, vec!["so", "ne", "we", "mw"]);
    }
}
