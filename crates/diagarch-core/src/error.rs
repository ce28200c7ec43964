//! Error types for bundle ingestion.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `IngestError`.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Represents a specific quota resource that was exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaResource {
    /// File count quota exceeded.
    FileCount {
        /// Current file count.
        current: usize,
        /// Maximum allowed file count.
        max: usize,
    },
    /// Total size quota exceeded.
    TotalSize {
        /// Current total size in bytes.
        current: u64,
        /// Maximum allowed total size in bytes.
        max: u64,
    },
    /// Single file size quota exceeded.
    FileSize {
        /// File size in bytes.
        size: u64,
        /// Maximum allowed file size in bytes.
        max: u64,
    },
    /// Integer overflow detected in quota tracking.
    IntegerOverflow,
}

impl std::fmt::Display for QuotaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileCount { current, max } => {
                write!(f, "quota exceeded: file count ({current} > {max})")
            }
            Self::TotalSize { current, max } => {
                write!(f, "quota exceeded: total size ({current} > {max})")
            }
            Self::FileSize { size, max } => {
                write!(f, "quota exceeded: single file size ({size} > {max})")
            }
            Self::IntegerOverflow => {
                write!(f, "quota exceeded: integer overflow in quota tracking")
            }
        }
    }
}

/// Errors that can occur while ingesting a diagnostic bundle.
///
/// Only conditions that make the whole bundle unusable are surfaced to
/// callers of the ingestion API. Per-artifact read failures during category
/// resolution are absorbed and never appear here.
#[derive(Error, Debug)]
pub enum IngestError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input path does not exist.
    #[error("archive not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("not a file: {path}")]
    NotAFile {
        /// The offending path.
        path: PathBuf,
    },

    /// Path exists but is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The container could not be opened or its members enumerated.
    #[error("invalid archive {path}: {reason}")]
    UnreadableArchive {
        /// The archive path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The archive opened fine but holds no members.
    #[error("archive is empty: {path}")]
    EmptyArchive {
        /// The archive path.
        path: PathBuf,
    },

    /// Extraction could not complete or produced no usable root.
    #[error("extraction of {path} failed: {reason}")]
    ExtractionFailed {
        /// The archive path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// Archive members live under more than one top-level directory.
    #[error("archive {path} has no single root directory (found: {})", candidates.join(", "))]
    AmbiguousRoot {
        /// The archive path.
        path: PathBuf,
        /// Distinct top-level segments, sorted.
        candidates: Vec<String>,
    },

    /// Caller supplied incomplete or contradictory input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Path traversal attempt detected.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The path that attempted traversal.
        path: PathBuf,
    },

    /// Symlink points outside extraction directory.
    #[error("symlink target outside extraction directory: {path}")]
    SymlinkEscape {
        /// The symlink path.
        path: PathBuf,
    },

    /// Hardlink target not in extraction directory.
    #[error("hardlink target outside extraction directory: {path}")]
    HardlinkEscape {
        /// The hardlink path.
        path: PathBuf,
    },

    /// Extraction quota exceeded.
    #[error("{resource}")]
    QuotaExceeded {
        /// Description of the exceeded resource.
        resource: QuotaResource,
    },

    /// Operation not permitted by security policy.
    #[error("operation denied by security policy: {reason}")]
    SecurityViolation {
        /// Reason for the violation.
        reason: String,
    },
}

impl IngestError {
    /// Returns `true` if the input itself is malformed or unreadable.
    ///
    /// Retrying without changing the input will not help.
    ///
    /// # Examples
    ///
    /// ```
    /// use diagarch_core::IngestError;
    /// use std::path::PathBuf;
    ///
    /// let err = IngestError::EmptyArchive {
    ///     path: PathBuf::from("empty.tar"),
    /// };
    /// assert!(err.is_input_error());
    /// ```
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::NotAFile { .. }
                | Self::NotADirectory { .. }
                | Self::UnreadableArchive { .. }
                | Self::EmptyArchive { .. }
                | Self::InvalidInput(_)
        )
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use diagarch_core::IngestError;
    /// use std::path::PathBuf;
    ///
    /// let err = IngestError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = IngestError::InvalidInput("workdir not set".into());
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. }
                | Self::SymlinkEscape { .. }
                | Self::HardlinkEscape { .. }
                | Self::QuotaExceeded { .. }
                | Self::SecurityViolation { .. }
        )
    }

    /// Returns the path this error is about, if it carries one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::NotAFile { path }
            | Self::NotADirectory { path }
            | Self::UnreadableArchive { path, .. }
            | Self::EmptyArchive { path }
            | Self::ExtractionFailed { path, .. }
            | Self::AmbiguousRoot { path, .. }
            | Self::PathTraversal { path }
            | Self::SymlinkEscape { path }
            | Self::HardlinkEscape { path } => Some(path),
            _ => None,
        }
    }

    /// Returns the quota resource that was exceeded, if applicable.
    #[must_use]
    pub const fn quota_resource(&self) -> Option<&QuotaResource> {
        match self {
            Self::QuotaExceeded { resource } => Some(resource),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = IngestError::NotFound {
            path: PathBuf::from("/tmp/missing.tar.xz"),
        };
        assert_eq!(err.to_string(), "archive not found: /tmp/missing.tar.xz");
    }

    #[test]
    fn test_ambiguous_root_lists_candidates() {
        let err = IngestError::AmbiguousRoot {
            path: PathBuf::from("bundle.tar"),
            candidates: vec!["a".into(), "b".into()],
        };
        let display = err.to_string();
        assert!(display.contains("no single root"));
        assert!(display.contains("a, b"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: IngestError = io_err.into();
        assert!(matches!(err, IngestError::Io(_)));
    }

    #[test]
    fn test_is_input_error() {
        assert!(IngestError::NotFound { path: "x".into() }.is_input_error());
        assert!(IngestError::NotAFile { path: "x".into() }.is_input_error());
        assert!(
            IngestError::UnreadableArchive {
                path: "x".into(),
                reason: "bad header".into(),
            }
            .is_input_error()
        );
        assert!(IngestError::EmptyArchive { path: "x".into() }.is_input_error());

        let err = IngestError::ExtractionFailed {
            path: "x".into(),
            reason: "no root directory found".into(),
        };
        assert!(!err.is_input_error());
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_is_security_violation() {
        let err = IngestError::SymlinkEscape {
            path: PathBuf::from("link"),
        };
        assert!(err.is_security_violation());

        let err = IngestError::QuotaExceeded {
            resource: QuotaResource::IntegerOverflow,
        };
        assert!(err.is_security_violation());

        let err = IngestError::EmptyArchive { path: "x".into() };
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_path_accessor() {
        let err = IngestError::ExtractionFailed {
            path: PathBuf::from("bundle.tar.gz"),
            reason: "boom".into(),
        };
        assert_eq!(err.path(), Some(Path::new("bundle.tar.gz")));

        let err = IngestError::InvalidInput("nope".into());
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_quota_exceeded_error() {
        let err = IngestError::QuotaExceeded {
            resource: QuotaResource::FileCount {
                current: 11,
                max: 10,
            },
        };
        let display = err.to_string();
        assert!(display.contains("file count"));
        assert!(display.contains("11"));
        assert_eq!(
            err.quota_resource(),
            Some(&QuotaResource::FileCount {
                current: 11,
                max: 10
            })
        );
    }
}
