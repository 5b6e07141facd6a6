//! Resources whose remote names follow no derivable pattern.
//!
//! These lists need a manual edit whenever the Census Bureau publishes a new
//! vintage.

use camino::Utf8PathBuf;

use crate::config::StaticDataset;
use crate::domain::ArchiveBundle;

const POPEST: &str = "https://www2.census.gov/programs-surveys/popest";

pub fn state_population() -> Vec<String> {
    let mut locators = vec![
        format!("{POPEST}/tables/1980-1990/state/asrh/st8090ts.txt"),
        format!("{POPEST}/tables/2010-2019/state/totals/nst-est2019-01.xlsx"),
        format!("{POPEST}/datasets/2010-2020/state/totals/nst-est2020-alldata.csv"),
        format!("{POPEST}/tables/2000-2010/intercensal/state/st-est00int-01.xls"),
        format!("{POPEST}/datasets/2020-2024/state/totals/NST-EST2024-ALLDATA.csv"),
    ];
    locators.extend((1990..2000).map(|year| {
        format!("{POPEST}/tables/1990-2000/intercensal/st-co/stch-icen{year}.txt")
    }));
    locators
}

/// FIPS codes 03, 07, 14, 43 and 52 were never assigned; 11 (DC) has no
/// per-state intercensal county table.
const SKIPPED_STATE_FIPS: [u8; 6] = [3, 7, 11, 14, 43, 52];

pub fn county_population() -> Vec<String> {
    let mut locators = vec![
        format!("{POPEST}/datasets/2010-2019/counties/totals/co-est2019-alldata.csv"),
        format!("{POPEST}/datasets/2010-2020/counties/totals/co-est2020-alldata.csv"),
        format!("{POPEST}/datasets/2020-2024/counties/totals/co-est2024-alldata.csv"),
        format!("{POPEST}/geographies/2019/all-geocodes-v2019.xlsx"),
        format!("{POPEST}/tables/1990-2000/counties/totals/99c8_00.txt"),
    ];
    locators.extend(
        (1u8..57)
            .filter(|fips| !SKIPPED_STATE_FIPS.contains(fips))
            .map(|fips| {
                format!("{POPEST}/tables/2000-2010/intercensal/county/co-est00int-01-{fips:02}.csv")
            }),
    );
    locators.extend(
        (1980..1990)
            .map(|year| format!("{POPEST}/tables/1980-1990/counties/asrh/pe-02-{year}.xls")),
    );
    locators
}

pub fn place_population() -> Vec<String> {
    vec![
        "https://www2.census.gov/geo/tiger/PREVGENZ/pl/us_places.txt".to_string(),
        format!(
            "{POPEST}/tables/1990-2000/2000-subcounties-evaluation-estimates/sc2000f_us.txt"
        ),
        format!("{POPEST}/datasets/2000-2010/intercensal/cities/sub-est00int.csv"),
        format!("{POPEST}/datasets/2010-2019/cities/totals/sub-est2019_all.csv"),
        format!("{POPEST}/datasets/2010-2020/cities/SUB-EST2020_ALL.csv"),
        format!("{POPEST}/datasets/2020-2024/cities/totals/sub-est2024.csv"),
    ]
}

pub fn crosswalks() -> Vec<String> {
    let delineation = "https://www2.census.gov/programs-surveys/metro-micro/geographies/reference-files";
    vec![
        format!("{delineation}/2023/delineation-files/list1_2023.xlsx"),
        format!("{delineation}/2020/delineation-files/list1_2020.xls"),
        format!("{delineation}/2013/delineation-files/list1.xls"),
        "https://www2.census.gov/geo/docs/reference/codes2020/national_county2020.txt".to_string(),
        "https://www2.census.gov/geo/docs/reference/codes2020/national_place2020.txt".to_string(),
    ]
}

pub fn default_static_datasets() -> Vec<StaticDataset> {
    vec![
        StaticDataset::new("population-state", "population/state", state_population()),
        StaticDataset::new("population-county", "population/county", county_population()),
        StaticDataset::new("population-place", "population/place", place_population()),
        StaticDataset::new("crosswalk", "crosswalk", crosswalks()),
    ]
}

pub fn default_archives() -> Vec<ArchiveBundle> {
    let gazetteer = "https://www2.census.gov/geo/docs/maps-data/data/gazetteer/2023_Gazetteer";
    vec![
        ArchiveBundle {
            locator: format!("{gazetteer}/2023_Gaz_place_national.zip"),
            extraction_root: Utf8PathBuf::from("gazetteer/place"),
            allow_list: vec!["2023_Gaz_place_national.txt".to_string()],
        },
        ArchiveBundle {
            locator: format!("{gazetteer}/2023_Gaz_counties_national.zip"),
            extraction_root: Utf8PathBuf::from("gazetteer/county"),
            allow_list: vec!["2023_Gaz_counties_national.txt".to_string()],
        },
    ]
}
