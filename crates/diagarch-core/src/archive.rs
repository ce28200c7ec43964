//! Archive validation.
//!
//! Validation opens the container just far enough to enumerate its members.
//! Nothing is written to disk, and the file and decoder stack are dropped
//! on every exit path.

use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::IngestError;
use crate::Result;
use crate::formats::Compression;
use crate::formats::TarStream;
use crate::formats::detect_compression;
use crate::formats::open_tar;

/// A validated, not yet extracted archive.
///
/// Only [`validate_archive`] constructs one, so holding an `ArchiveHandle`
/// means the file was a readable, non-empty tar container at validation
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHandle {
    path: PathBuf,
    compression: Compression,
    member_count: usize,
}

impl ArchiveHandle {
    /// Returns the absolute path of the archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the compression family detected from content.
    #[must_use]
    pub const fn compression(&self) -> Compression {
        self.compression
    }

    /// Returns the number of members enumerated during validation.
    #[must_use]
    pub const fn member_count(&self) -> usize {
        self.member_count
    }

    /// Reopens the container for a fresh pass over its members.
    pub(crate) fn open(&self) -> std::io::Result<TarStream> {
        open_tar(&self.path, self.compression)
    }
}

/// Confirms `path` is a readable, non-empty tar archive.
///
/// # Errors
///
/// - `NotFound` if the path does not exist
/// - `NotAFile` if it is not a regular file
/// - `UnreadableArchive` if the container cannot be opened or a member
///   header cannot be read
/// - `EmptyArchive` if the container holds no members
///
/// # Examples
///
/// ```no_run
/// use diagarch_core::validate_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = validate_archive("sosreport-web01-2023-04-15-abcdef.tar.xz")?;
/// println!(
///     "{} members, {} compressed",
///     handle.member_count(),
///     handle.compression()
/// );
/// # Ok(())
/// # }
/// ```
pub fn validate_archive<P: AsRef<Path>>(path: P) -> Result<ArchiveHandle> {
    let path = path.as_ref();
    debug!(archive = %path.display(), "validating archive");

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(IngestError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(unreadable(path, &e)),
    };

    if !metadata.is_file() {
        return Err(IngestError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let absolute = path.canonicalize().map_err(|e| unreadable(path, &e))?;
    let compression = detect_compression(&absolute).map_err(|e| unreadable(path, &e))?;
    let member_count = count_members(&absolute, compression)?;

    if member_count == 0 {
        return Err(IngestError::EmptyArchive {
            path: path.to_path_buf(),
        });
    }

    debug!(
        archive = %absolute.display(),
        %compression,
        members = member_count,
        "archive validated"
    );

    Ok(ArchiveHandle {
        path: absolute,
        compression,
        member_count,
    })
}

fn count_members(path: &Path, compression: Compression) -> Result<usize> {
    let mut archive = open_tar(path, compression).map_err(|e| unreadable(path, &e))?;
    let entries = archive.entries().map_err(|e| unreadable(path, &e))?;

    let mut count = 0;
    for entry in entries {
        entry.map_err(|e| unreadable(path, &e))?;
        count += 1;
    }
    Ok(count)
}

fn unreadable(path: &Path, err: &std::io::Error) -> IngestError {
    IngestError::UnreadableArchive {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
