mod common;

use assert_matches::assert_matches;
use camino::{Utf8Path, Utf8PathBuf};

use census_mirror::archive::ZipExtractor;
use census_mirror::domain::ResourceDescriptor;
use census_mirror::error::MirrorError;
use census_mirror::fetch::{Fetcher, TransferLog};
use census_mirror::orchestrator::Orchestrator;

use common::{MockFetcher, utf8};

struct PanickingFetcher;

impl Fetcher for PanickingFetcher {
    fn fetch(&self, _locator: &str, _destination_dir: &Utf8Path) -> Result<Utf8PathBuf, MirrorError> {
        panic!("connection reset");
    }
}

#[test]
fn enqueue_creates_destination_and_saves_under_remote_name() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8(temp.path());
    let log = TransferLog::create(&root.join("transfers.log")).unwrap();
    let orchestrator = Orchestrator::new(MockFetcher::default(), ZipExtractor, log);

    let descriptor = ResourceDescriptor::new(
        "https://www2.census.gov/econ/bps/Place/Midwest Region/mw1999a.txt",
        root.join("data/bps/Place/Midwest Region"),
    );
    let handle = orchestrator.enqueue(descriptor).unwrap();
    assert!(root.join("data/bps/Place/Midwest Region").is_dir());

    let path = handle.join().unwrap();
    assert_eq!(path, root.join("data/bps/Place/Midwest Region/mw1999a.txt"));
    assert!(path.is_file());
}

#[test]
fn handles_run_independently() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8(temp.path());
    let log = TransferLog::create(&root.join("transfers.log")).unwrap();
    let orchestrator = Orchestrator::new(MockFetcher::default(), ZipExtractor, log);

    let handles = (1990..2000)
        .map(|year| {
            orchestrator
                .enqueue(ResourceDescriptor::new(
                    format!("https://www2.census.gov/econ/bps/County/co{year}a.txt"),
                    root.join("data/bps/County"),
                ))
                .unwrap()
        })
        .collect::<Vec<_>>();
    let outcomes = handles.into_iter().map(|h| h.wait()).collect::<Vec<_>>();
    assert!(outcomes.iter().all(|o| o.is_success()));
    assert_eq!(
        std::fs::read_dir(root.join("data/bps/County").as_std_path())
            .unwrap()
            .count(),
        10
    );
}

#[test]
fn panicking_transfer_surfaces_on_join() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8(temp.path());
    let log = TransferLog::create(&root.join("transfers.log")).unwrap();
    let orchestrator = Orchestrator::new(PanickingFetcher, ZipExtractor, log);

    let handle = orchestrator
        .enqueue(ResourceDescriptor::new(
            "https://www2.census.gov/econ/bps/State/st2000a.txt",
            root.join("data/bps/State"),
        ))
        .unwrap();
    assert_eq!(handle.locator(), "https://www2.census.gov/econ/bps/State/st2000a.txt");
    assert_matches!(handle.join(), Err(MirrorError::TaskPanicked(message)) if message == "connection reset");
}
