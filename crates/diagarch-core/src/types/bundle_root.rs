//! The logical top of an extracted diagnostic tree.

use std::path::Path;
use std::path::PathBuf;

use crate::IngestError;
use crate::Result;

/// Directory that all category paths are resolved against.
///
/// Invariant: the path is canonical, exists, and is a directory at the time
/// of construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleRoot(PathBuf);

impl BundleRoot {
    /// Opens an already-extracted bundle directory.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the path does not exist and `NotADirectory` if
    /// it is not a directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use diagarch_core::BundleRoot;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let root = BundleRoot::open("/var/tmp/sosreport-web01-2023-04-15-abcdef")?;
    /// assert!(root.join("etc/fstab").starts_with(root.as_path()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(Self(path.canonicalize()?)),
            Ok(_) => Err(IngestError::NotADirectory {
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(IngestError::NotFound {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(IngestError::Io(e)),
        }
    }

    /// Returns the root directory.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns the root's directory name, usually the bundle's own name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.file_name().and_then(|n| n.to_str())
    }

    /// Joins a bundle-relative path.
    #[inline]
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.0.join(relative)
    }
}

impl AsRef<Path> for BundleRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
