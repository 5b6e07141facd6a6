#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use camino::{Utf8Path, Utf8PathBuf};
use zip::write::SimpleFileOptions;

use census_mirror::config::{MirrorConfig, StaticDataset};
use census_mirror::domain::{ArchiveBundle, locator_file_name};
use census_mirror::error::MirrorError;
use census_mirror::fetch::Fetcher;
use census_mirror::temporal::YearMonth;

/// Writes the locator as file content, or `archive` bytes for `.zip` locators.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub failing: HashSet<String>,
    pub archive: Vec<u8>,
}

impl MockFetcher {
    pub fn with_archive(archive: Vec<u8>) -> Self {
        Self {
            archive,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, locator: &str, destination_dir: &Utf8Path) -> Result<Utf8PathBuf, MirrorError> {
        self.calls.lock().unwrap().push(locator.to_string());
        if self.failing.contains(locator) {
            return Err(MirrorError::HttpStatus {
                status: 404,
                url: locator.to_string(),
            });
        }
        let path = destination_dir.join(locator_file_name(locator)?);
        let content = if locator.ends_with(".zip") {
            self.archive.clone()
        } else {
            locator.as_bytes().to_vec()
        };
        fs::write(path.as_std_path(), content).map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        Ok(path)
    }
}

/// Builds a zip with the allow-listed table nested in a folder plus noise.
pub fn gazetteer_zip() -> Vec<u8> {
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory("2023_Gaz/", options).unwrap();
    writer
        .start_file("2023_Gaz/2023_Gaz_place_national.txt", options)
        .unwrap();
    writer.write_all(b"USPS\tGEOID\tNAME\n").unwrap();
    writer.start_file("2023_Gaz/record_layout.pdf", options).unwrap();
    writer.write_all(b"%PDF").unwrap();
    writer.start_file("README.txt", options).unwrap();
    writer.write_all(b"readme").unwrap();
    writer.finish().unwrap().into_inner()
}

/// Two folders each carrying a file with the same name.
pub fn duplicate_name_zip() -> Vec<u8> {
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file("2022/national.txt", options).unwrap();
    writer.write_all(b"first").unwrap();
    writer.start_file("2023/national.txt", options).unwrap();
    writer.write_all(b"second").unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn utf8(path: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
}

/// Small configuration rooted in `root`: permits 2019-2020 plus March 2021.
pub fn small_config(root: &Utf8Path) -> MirrorConfig {
    let mut config = MirrorConfig::default();
    config.data_root = root.join("data");
    config.transfer_log = root.join("transfers.log");
    config.permits.start_year = 2019;
    config.permits.previous_year = 2020;
    config.permits.latest_month = YearMonth {
        year: 2021,
        month: 3,
    };
    config.static_datasets = vec![
        StaticDataset::new(
            "population-state",
            "population/state",
            vec![
                "https://example.org/popest/st8090ts.txt".to_string(),
                "https://example.org/popest/nst-est2020-alldata.csv".to_string(),
            ],
        ),
        StaticDataset::new(
            "crosswalk",
            "crosswalk",
            vec!["https://example.org/metro/list1_2023.xlsx".to_string()],
        ),
    ];
    config.archives = vec![ArchiveBundle {
        locator: "https://example.org/gazetteer/2023_Gaz_place_national.zip".to_string(),
        extraction_root: Utf8PathBuf::from("gazetteer/place"),
        allow_list: vec!["2023_Gaz_place_national.txt".to_string()],
    }];
    config
}
