//! Bundle root detection.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::Path;

use tracing::debug;

use crate::IngestError;
use crate::Result;
use crate::types::BundleRoot;
use crate::types::DestDir;

/// Picks the bundle root from the distinct top-level segments of every
/// extracted member.
///
/// Diagnostic bundles wrap everything in one directory named after the
/// host and collection time, so exactly one segment is expected and it must
/// be a real directory (not a link) under `dest`.
pub(crate) fn detect_root(
    dest: &DestDir,
    segments: &BTreeSet<OsString>,
    archive: &Path,
) -> Result<BundleRoot> {
    let mut iter = segments.iter();
    let (Some(segment), None) = (iter.next(), iter.next()) else {
        if segments.is_empty() {
            return Err(no_root(archive));
        }
        return Err(IngestError::AmbiguousRoot {
            path: archive.to_path_buf(),
            candidates: segments
                .iter()
                .map(|s| s.to_string_lossy().into_owned())
                .collect(),
        });
    };

    let candidate = dest.as_path().join(segment);
    debug!(root = %candidate.display(), "detected bundle root");
    match std::fs::symlink_metadata(&candidate) {
        Ok(meta) if meta.is_dir() => BundleRoot::open(&candidate),
        _ => Err(no_root(archive)),
    }
}

fn no_root(archive: &Path) -> IngestError {
    IngestError::ExtractionFailed {
        path: archive.to_path_buf(),
        reason: "no root directory found".into(),
    }
}
