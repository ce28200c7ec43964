//! Best-effort bundle dating.
//!
//! Collection tools embed the collection date in the archive name
//! (`sosreport-web01-2023-04-15-abcdef.tar.xz`). When the name carries no
//! date, the archive's modification time is the next best guess.

use std::fmt;
use std::path::Path;

use chrono::DateTime;
use chrono::Local;
use serde::Serialize;

/// Label used when no date can be determined.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Where a [`BundleTimestamp`] label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// A `YYYY-MM-DD` date found in the archive file name.
    Filename,
    /// The archive's modification time, in local time.
    Modified,
    /// Neither was available.
    Unknown,
}

/// A display label for when a bundle was collected.
///
/// The label is for display and ordering only; it is not validated as a
/// calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleTimestamp {
    /// `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, or `Unknown`.
    pub label: String,
    /// How the label was obtained.
    pub source: TimestampSource,
}

impl BundleTimestamp {
    fn unknown() -> Self {
        Self {
            label: UNKNOWN_LABEL.to_string(),
            source: TimestampSource::Unknown,
        }
    }
}

impl fmt::Display for BundleTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Derives a collection date label for an archive. Never fails.
///
/// # Examples
///
/// ```
/// use diagarch_core::TimestampSource;
/// use diagarch_core::resolve_timestamp;
///
/// let ts = resolve_timestamp("/nonexistent/sosreport-web01-2023-04-15-abcdef.tar.xz");
/// assert_eq!(ts.label, "2023-04-15");
/// assert_eq!(ts.source, TimestampSource::Filename);
/// ```
pub fn resolve_timestamp<P: AsRef<Path>>(path: P) -> BundleTimestamp {
    let path = path.as_ref();

    if let Some(label) = date_from_name(path) {
        return BundleTimestamp {
            label,
            source: TimestampSource::Filename,
        };
    }

    match std::fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(modified) => BundleTimestamp {
            label: DateTime::<Local>::from(modified)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            source: TimestampSource::Modified,
        },
        Err(e) => {
            tracing::debug!(archive = %path.display(), error = %e, "no timestamp for archive");
            BundleTimestamp::unknown()
        }
    }
}

/// Finds the first `YYYY-MM-DD` run of `-`-separated tokens in the name,
/// ignoring everything from `.tar` onward.
fn date_from_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let base = stem.split(".tar").next().unwrap_or(stem);
    let parts: Vec<&str> = base.split('-').collect();

    parts.windows(3).find_map(|w| {
        (is_digits(w[0], 4) && is_digits(w[1], 2) && is_digits(w[2], 2))
            .then(|| format!("{}-{}-{}", w[0], w[1], w[2]))
    })
}

fn is_digits(token: &str, len: usize) -> bool {
    token.len() == len && token.bytes().all(|b| b.is_ascii_digit())
}
