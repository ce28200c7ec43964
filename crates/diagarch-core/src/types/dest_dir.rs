//! Validated destination directory type.

use crate::IngestError;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;

/// A validated destination directory for bundle extraction.
///
/// Once constructed, a `DestDir` is an existing directory represented by its
/// absolute canonical path. Every member path written during extraction is
/// checked against this prefix.
///
/// # Examples
///
/// ```no_run
/// use diagarch_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/var/tmp/diagarch/work-1")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a `DestDir` from an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist (`NotFound`)
    /// - The path exists but is not a directory (`NotADirectory`)
    /// - The path cannot be canonicalized
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(IngestError::NotFound { path });
        }

        if !path.is_dir() {
            return Err(IngestError::NotADirectory { path });
        }

        let canonical = path.canonicalize().map_err(|e| {
            IngestError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {}", path.display(), e),
            ))
        })?;

        Ok(Self(canonical))
    }

    /// Creates the directory (and its parents) if missing, then validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or validated.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }
        Self::new(path)
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a `SafePath` to this destination directory.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }
}
