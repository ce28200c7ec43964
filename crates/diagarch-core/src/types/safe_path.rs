//! Validated safe path type for bundle extraction.

use crate::IngestConfig;
use crate::IngestError;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;

/// A validated archive member path that is safe to write under a `DestDir`.
///
/// `SafePath` is always relative and normalized. Validation:
///
/// 1. rejects NUL bytes
/// 2. neutralizes a leading root (`/etc/fstab` becomes `etc/fstab`, as GNU
///    tar does)
/// 3. drops `.` components
/// 4. rejects any `..` component
/// 5. rejects paths deeper than `max_path_depth`
/// 6. rejects paths whose existing parent canonicalizes outside the
///    destination (a symlinked directory planted by an earlier member)
///
/// There is no `From<PathBuf>`; the only constructor is [`SafePath::validate`].
///
/// # Examples
///
/// ```no_run
/// use diagarch_core::IngestConfig;
/// use diagarch_core::types::DestDir;
/// use diagarch_core::types::SafePath;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/tmp/work")?;
/// let config = IngestConfig::default();
///
/// let safe = SafePath::validate(Path::new("./sosreport-a/etc/fstab"), &dest, &config)?;
/// assert_eq!(safe.as_path(), Path::new("sosreport-a/etc/fstab"));
///
/// assert!(SafePath::validate(Path::new("../etc/passwd"), &dest, &config).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates and constructs a `SafePath`.
    ///
    /// # Errors
    ///
    /// - `IngestError::PathTraversal` for `..`, empty paths, or a parent
    ///   resolving outside the destination
    /// - `IngestError::SecurityViolation` for NUL bytes or excessive depth
    pub fn validate(path: &Path, dest: &DestDir, config: &IngestConfig) -> Result<Self> {
        if has_null_bytes(path) {
            return Err(IngestError::SecurityViolation {
                reason: format!("path contains null bytes: {}", path.display()),
            });
        }

        let normalized = normalize_member_path(path)?;

        let depth = normalized.components().count();
        if depth == 0 {
            return Err(IngestError::PathTraversal {
                path: path.to_path_buf(),
            });
        }
        if depth > config.max_path_depth {
            return Err(IngestError::SecurityViolation {
                reason: format!(
                    "path depth {depth} exceeds maximum {}",
                    config.max_path_depth
                ),
            });
        }

        let resolved = dest.as_path().join(&normalized);

        // A parent that already exists must not lead out of the destination.
        if let Some(parent) = resolved.parent() {
            match parent.canonicalize() {
                Ok(canonical_parent) => {
                    if !canonical_parent.starts_with(dest.as_path()) {
                        return Err(IngestError::PathTraversal {
                            path: path.to_path_buf(),
                        });
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(IngestError::Io(std::io::Error::new(
                        e.kind(),
                        format!("failed to canonicalize parent: {e}"),
                    )));
                }
            }
        }

        Ok(Self(normalized))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns the first path segment, which names the bundle's top-level
    /// directory.
    #[must_use]
    pub fn top_level(&self) -> Option<&std::ffi::OsStr> {
        self.0.components().next().map(Component::as_os_str)
    }
}

/// Strips root and `.` components and rejects `..`.
fn normalize_member_path(path: &Path) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(comp) => normalized.push(comp),
            Component::CurDir | Component::RootDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                return Err(IngestError::PathTraversal {
                    path: path.to_path_buf(),
                });
            }
        }
    }
    Ok(normalized)
}

/// Checks if a path contains null bytes.
#[cfg(unix)]
fn has_null_bytes(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&b'\0')
}

/// Checks if a path contains null bytes.
#[cfg(not(unix))]
fn has_null_bytes(path: &Path) -> bool {
    path.to_str().is_none_or(|s| s.contains('\0'))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dest() -> (TempDir, DestDir) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path().to_path_buf()).expect("failed to create dest");
        (temp, dest)
    }

    #[test]
    fn test_empty_path() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default();

        for path in ["", ".", "./", "/"] {
            let result = SafePath::validate(Path::new(path), &dest, &config);
            assert!(
                matches!(result, Err(IngestError::PathTraversal { .. })),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_valid_relative() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default();

        let path = Path::new("sosreport-host/sos_commands/lvm2/pvs_-a_-o_pv_all");
        let safe = SafePath::validate(path, &dest, &config).unwrap();
        assert_eq!(safe.as_path(), path);
        assert_eq!(safe.top_level().unwrap(), "sosreport-host");
    }

    #[test]
    fn test_reject_parent_traversal() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default();

        for path in ["../etc/passwd", "foo/../../etc/passwd", "foo/.."] {
            let result = SafePath::validate(Path::new(path), &dest, &config);
            assert!(
                matches!(result, Err(IngestError::PathTraversal { .. })),
                "path should be rejected: {path}"
            );
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_path_is_neutralized() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default();

        let safe = SafePath::validate(Path::new("/etc/fstab"), &dest, &config).unwrap();
        assert_eq!(safe.as_path(), Path::new("etc/fstab"));
    }

    #[test]
    fn test_current_dir_components_dropped() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default();

        let safe = SafePath::validate(Path::new("./a/./b.txt"), &dest, &config).unwrap();
        assert_eq!(safe.as_path(), Path::new("a/b.txt"));
    }

    #[test]
    fn test_reject_excessive_depth() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default().with_max_path_depth(3);

        let result = SafePath::validate(Path::new("a/b/c/d"), &dest, &config);
        assert!(matches!(result, Err(IngestError::SecurityViolation { .. })));
        assert!(SafePath::validate(Path::new("a/b/c"), &dest, &config).is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn test_reject_null_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default();
        let path = Path::new(OsStr::from_bytes(b"a/b\0c"));

        let result = SafePath::validate(path, &dest, &config);
        assert!(matches!(result, Err(IngestError::SecurityViolation { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_reject_write_through_planted_symlink_dir() {
        let (temp, dest) = create_test_dest();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("escape")).unwrap();

        let config = IngestConfig::default();
        let result = SafePath::validate(Path::new("escape/owned.txt"), &dest, &config);
        assert!(matches!(result, Err(IngestError::PathTraversal { .. })));
    }
}
