use assert_matches::assert_matches;

use census_mirror::catalog::PermitFamily;
use camino::Utf8PathBuf;

use census_mirror::config::{ConfigLoader, MAX_YEAR, MirrorConfig, StaticDataset};
use census_mirror::domain::ArchiveBundle;
use census_mirror::error::MirrorError;

fn with_archive_root(root: &str) -> MirrorConfig {
    let mut config = MirrorConfig::default();
    config.archives.push(ArchiveBundle {
        locator: "https://example.org/extra.zip".to_string(),
        extraction_root: Utf8PathBuf::from(root),
        allow_list: vec!["extra.txt".to_string()],
    });
    config
}

#[test]
fn minimal_json_fills_defaults() {
    let config = ConfigLoader::parse(
        r#"{
            "permits": {
                "prefix": "https://www2.census.gov/econ/bps/",
                "start_year": 1980,
                "family_start_years": { "county": 1990 },
                "previous_year": 2021,
                "latest_month": { "year": 2022, "month": 6 }
            }
        }"#,
    )
    .unwrap();

    let defaults = MirrorConfig::default();
    assert_eq!(config.data_root, defaults.data_root);
    assert_eq!(config.regions, defaults.regions);
    assert_eq!(config.static_datasets, defaults.static_datasets);
    assert!(!config.permits.use_previous_december);
    assert_eq!(config.permits.first_year(PermitFamily::County), 1990);
    assert_eq!(config.transfer_timeout_secs, None);
}

#[test]
fn out_of_range_month_is_rejected() {
    let err = ConfigLoader::parse(
        r#"{
            "permits": {
                "prefix": "https://www2.census.gov/econ/bps/",
                "start_year": 1980,
                "previous_year": 2021,
                "latest_month": { "year": 2022, "month": 0 }
            }
        }"#,
    )
    .unwrap_err();
    assert_matches!(err, MirrorError::InvalidMonth { month: 0, .. });
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert_matches!(
        ConfigLoader::parse("{ not json"),
        Err(MirrorError::ConfigParse(_))
    );
}

#[test]
fn missing_explicit_file_is_a_read_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(MirrorError::ConfigRead(_))
    );
}

#[test]
fn config_round_trips_through_json() {
    let config = MirrorConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let parsed = ConfigLoader::parse(&json).unwrap();
    assert_eq!(parsed.archives, config.archives);
    assert_eq!(parsed.permits.latest_month, config.permits.latest_month);
}

#[test]
fn archive_roots_must_stay_below_data_root() {
    for root in ["", "  ", "/tmp/gazetteer", "../outside", "gazetteer/../..", "./extra"] {
        assert_matches!(
            with_archive_root(root).validate(),
            Err(MirrorError::InvalidConfig(_)),
            "root {root:?} was accepted"
        );
    }
    with_archive_root("gazetteer/extra").validate().unwrap();
}

#[test]
fn static_destinations_must_stay_below_data_root() {
    for destination in ["", "/srv/population", "../population"] {
        let mut config = MirrorConfig::default();
        config.static_datasets.push(StaticDataset::new(
            "extra",
            destination,
            vec!["https://example.org/extra.csv".to_string()],
        ));
        assert_matches!(
            config.validate(),
            Err(MirrorError::InvalidConfig(_)),
            "destination {destination:?} was accepted"
        );
    }
}

#[test]
fn archive_roots_must_not_overlap_other_outputs() {
    // Another archive's root, a parent of it, a static destination, a child
    // of one, and the permits tree.
    for root in ["gazetteer/place", "gazetteer", "crosswalk", "population/state/extra", "bps"] {
        assert_matches!(
            with_archive_root(root).validate(),
            Err(MirrorError::InvalidConfig(_)),
            "root {root:?} was accepted"
        );
    }
}

#[test]
fn years_past_four_digits_are_rejected() {
    let mut config = MirrorConfig::default();
    config.permits.previous_year = u16::MAX;
    assert_matches!(config.validate(), Err(MirrorError::InvalidConfig(_)));

    let mut config = MirrorConfig::default();
    config.permits.previous_year = MAX_YEAR + 1;
    config.permits.latest_month.year = MAX_YEAR + 1;
    assert_matches!(config.validate(), Err(MirrorError::InvalidConfig(_)));

    let mut config = MirrorConfig::default();
    config.permits.previous_year = MAX_YEAR;
    config.permits.latest_month.year = MAX_YEAR;
    config.validate().unwrap();

    let mut config = MirrorConfig::default();
    config.permits.latest_month.year = MAX_YEAR + 1;
    assert_matches!(config.validate(), Err(MirrorError::InvalidConfig(_)));
}
