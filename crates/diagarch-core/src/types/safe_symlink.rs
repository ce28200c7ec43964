//! Validated safe symlink type.

use crate::IngestConfig;
use crate::IngestError;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;
use super::SafePath;

/// A validated symlink that is safe to create during extraction.
///
/// Diagnostic bundles lean on symlinks heavily (a sosreport's top-level
/// `df` or `uname` point into `sos_commands/`), so they are allowed by
/// default, but only when:
///
/// - symlinks are enabled in [`IngestConfig`]
/// - the target is relative, with `..` only as leading components
/// - the target, resolved against the link's parent, stays inside the
///   destination
/// - no existing component of the link's parent chain is itself a symlink
///
/// # Examples
///
/// ```no_run
/// use diagarch_core::IngestConfig;
/// use diagarch_core::types::DestDir;
/// use diagarch_core::types::SafePath;
/// use diagarch_core::types::SafeSymlink;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/tmp/work")?;
/// let config = IngestConfig::default();
///
/// let link = SafePath::validate(Path::new("sosreport-a/df"), &dest, &config)?;
/// let target = Path::new("sos_commands/filesys/df_-al_-x_autofs");
/// let symlink = SafeSymlink::validate(&link, target, &dest, &config)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeSymlink {
    target_path: PathBuf,
}

impl SafeSymlink {
    /// Validates and constructs a `SafeSymlink`.
    ///
    /// # Errors
    ///
    /// - `SecurityViolation` if symlinks are disabled
    /// - `SymlinkEscape` if the target is absolute, resolves outside the
    ///   destination, or the parent chain contains a symlink
    pub fn validate(
        link: &SafePath,
        target: &Path,
        dest: &DestDir,
        config: &IngestConfig,
    ) -> Result<Self> {
        if !config.allow_symlinks {
            return Err(IngestError::SecurityViolation {
                reason: "symlinks not allowed".into(),
            });
        }

        if target.has_root() || target.as_os_str().is_empty() {
            return Err(IngestError::SymlinkEscape {
                path: link.as_path().to_path_buf(),
            });
        }

        if !parent_refs_are_leading(target) {
            return Err(IngestError::SymlinkEscape {
                path: link.as_path().to_path_buf(),
            });
        }

        verify_parent_not_symlink(link.as_path(), dest)?;

        let link_parent = link.as_path().parent().unwrap_or_else(|| Path::new(""));
        let resolved = lexical_normalize(&dest.as_path().join(link_parent).join(target));

        // The link may not point at the destination itself either.
        if !resolved.starts_with(dest.as_path()) || resolved == dest.as_path() {
            return Err(IngestError::SymlinkEscape {
                path: link.as_path().to_path_buf(),
            });
        }

        Ok(Self {
            target_path: target.to_path_buf(),
        })
    }

    /// Returns the target exactly as stored in the archive.
    #[inline]
    #[must_use]
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }
}

/// Returns `true` if every `..` in `target` precedes its first normal
/// component.
///
/// Walking up is then confined to the link's real parent chain, and walking
/// down only passes through links that were validated the same way. A `..`
/// after a normal component could climb out of a directory reached through
/// another symlink, which lexical resolution cannot see.
fn parent_refs_are_leading(target: &Path) -> bool {
    let mut descended = false;
    for component in target.components() {
        match component {
            Component::Normal(_) => descended = true,
            Component::ParentDir if descended => return false,
            _ => {}
        }
    }
    true
}

/// Rejects a link whose parent chain already contains a symlink.
///
/// Lexical target resolution is only sound when every parent is a real
/// directory.
fn verify_parent_not_symlink(path: &Path, dest: &DestDir) -> Result<()> {
    let mut current = dest.as_path().to_path_buf();
    let Some(parent) = path.parent() else {
        return Ok(());
    };

    for component in parent.components() {
        current.push(component);
        match std::fs::symlink_metadata(&current) {
            Ok(metadata) if metadata.is_symlink() => {
                return Err(IngestError::SymlinkEscape {
                    path: path.to_path_buf(),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => break,
            Err(_) => {
                return Err(IngestError::SymlinkEscape {
                    path: path.to_path_buf(),
                });
            }
        }
    }

    Ok(())
}

/// Resolves `.` and `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut components = Vec::with_capacity(path.components().count());

    for component in path.components() {
        match component {
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            Component::CurDir => {}
            _ => components.push(component),
        }
    }

    components.iter().collect()
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

    fn link(path: &str, dest: &DestDir) -> SafePath {
        SafePath::validate(Path::new(path), dest, &IngestConfig::default())
            .expect("link path should be valid")
    }

    #[test]
    fn test_valid_internal_target() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default();

        let link = link("sos/df", &dest);
        let symlink =
            SafeSymlink::validate(&link, Path::new("sos_commands/filesys/df"), &dest, &config)
                .unwrap();
        assert_eq!(symlink.target_path(), Path::new("sos_commands/filesys/df"));
    }

    #[test]
    fn test_valid_parent_relative_target() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default();

        let link = link("sos/etc/mtab", &dest);
        let result = SafeSymlink::validate(&link, Path::new("../proc/mounts"), &dest, &config);
        assert!(result.is_ok());
    }

    #[test]
    fn test_reject_when_disabled() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default().with_symlinks(false);

        let link = link("link", &dest);
        let result = SafeSymlink::validate(&link, Path::new("target.txt"), &dest, &config);
        assert!(matches!(result, Err(IngestError::SecurityViolation { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_reject_absolute_target() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default();

        let link = link("sos/etc/localtime", &dest);
        let result = SafeSymlink::validate(
            &link,
            Path::new("/usr/share/zoneinfo/UTC"),
            &dest,
            &config,
        );
        assert!(matches!(result, Err(IngestError::SymlinkEscape { .. })));
    }

    #[test]
    fn test_reject_escaping_target() {
        let (_temp, dest) = create_test_dest();
        let config = IngestConfig::default();

        let link = link("sos/link", &dest);
        for target in ["../../etc/passwd", "../..", "..", "a/../../../x", "l2/../x"] {
            let result = SafeSymlink::validate(&link, Path::new(target), &dest, &config);
            assert!(
                matches!(result, Err(IngestError::SymlinkEscape { .. })),
                "target should be rejected: {target}"
            );
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_reject_link_under_symlinked_parent() {
        let (temp, dest) = create_test_dest();
        let config = IngestConfig::default();
        std::fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink("real", temp.path().join("alias")).unwrap();

        let link = link("alias/link", &dest);
        let result = SafeSymlink::validate(&link, Path::new("file.txt"), &dest, &config);
        assert!(matches!(result, Err(IngestError::SymlinkEscape { .. })));
    }

    #[test]
    fn test_parent_refs_are_leading() {
        assert!(parent_refs_are_leading(Path::new("../../sos_commands/x")));
        assert!(parent_refs_are_leading(Path::new("./sos_commands/x")));
        assert!(!parent_refs_are_leading(Path::new("l2/../../x")));
        assert!(!parent_refs_are_leading(Path::new("../a/../b")));
    }

    #[test]
    fn test_lexical_normalize() {
        assert_eq!(
            lexical_normalize(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(lexical_normalize(Path::new("/a/../../b")), PathBuf::from("/b"));
    }
}
