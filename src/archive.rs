use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::domain::ArchiveBundle;
use crate::error::MirrorError;
use crate::fetch::Fetcher;

pub trait Extractor: Send + Sync {
    /// Extracts every file entry directly into `target_dir`, returning the
    /// distinct names written. A later entry with a repeated name wins.
    fn extract(&self, archive: &Utf8Path, target_dir: &Utf8Path) -> Result<Vec<String>, MirrorError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl Extractor for ZipExtractor {
    fn extract(&self, archive: &Utf8Path, target_dir: &Utf8Path) -> Result<Vec<String>, MirrorError> {
        let file = fs::File::open(archive.as_std_path())
            .map_err(|err| MirrorError::Archive(format!("open zip {archive}: {err}")))?;
        let mut zip = ZipArchive::new(file).map_err(|err| MirrorError::Archive(err.to_string()))?;
        fs::create_dir_all(target_dir.as_std_path())
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;

        let mut written = Vec::new();
        let mut seen = HashSet::new();
        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|err| MirrorError::Archive(err.to_string()))?;
            if entry.is_dir() {
                continue;
            }
            let enclosed = entry.enclosed_name().ok_or_else(|| {
                MirrorError::Archive("zip entry path traversal detected".to_string())
            })?;
            // Nested folders inside the bundle are flattened away.
            let Some(name) = enclosed.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let name = name.to_string();
            let repeated = !seen.insert(name.clone());
            if repeated {
                warn!(
                    archive = %archive,
                    entry = %enclosed.display(),
                    name = %name,
                    "archive.duplicate_name"
                );
            }

            let mut outfile = fs::File::create(target_dir.join(&name).as_std_path())
                .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
            io::copy(&mut entry, &mut outfile)
                .map_err(|err| MirrorError::Archive(format!("{name}: {err}")))?;
            if !repeated {
                written.push(name);
            }
        }
        Ok(written)
    }
}

/// Deletes every file or directory in `dir` whose name is not allow-listed.
/// Returns the names that remain, sorted.
pub fn retain_allow_listed(dir: &Utf8Path, allow_list: &[String]) -> Result<Vec<String>, MirrorError> {
    let allowed = allow_list.iter().map(String::as_str).collect::<BTreeSet<_>>();
    let mut kept = Vec::new();

    let entries = fs::read_dir(dir.as_std_path())
        .map_err(|err| MirrorError::Filesystem(format!("read {dir}: {err}")))?;
    for entry in entries {
        let entry = entry.map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if allowed.contains(name.as_str()) {
            kept.push(name);
            continue;
        }
        let path = entry.path();
        let removal = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removal.map_err(|err| MirrorError::Filesystem(format!("remove {name}: {err}")))?;
        debug!(entry = %name, "archive.discard");
    }
    kept.sort();
    Ok(kept)
}

/// Fetch, extract and filter one bundle. The downloaded zip lives in a
/// temporary directory that is removed however this returns.
pub fn acquire_archive(
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
    bundle: &ArchiveBundle,
) -> Result<Utf8PathBuf, MirrorError> {
    let temp_dir = tempfile::Builder::new()
        .prefix("census-mirror-archive")
        .tempdir()
        .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
    let temp_path = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
        .map_err(|_| MirrorError::Filesystem("non-utf8 temp dir".to_string()))?;

    let archive = fetcher.fetch(&bundle.locator, &temp_path)?;
    let extracted = extractor.extract(&archive, &bundle.extraction_root)?;
    let kept = retain_allow_listed(&bundle.extraction_root, &bundle.allow_list)?;
    info!(
        url = %bundle.locator,
        extracted = extracted.len(),
        kept = kept.len(),
        "archive.done"
    );
    Ok(bundle.extraction_root.clone())
}
