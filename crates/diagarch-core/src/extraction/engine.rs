//! Sandboxed extraction of a validated archive.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::quota::QuotaTracker;
use super::root::detect_root;
use crate::ArchiveHandle;
use crate::ExtractionReport;
use crate::IngestConfig;
use crate::IngestError;
use crate::Result;
use crate::types::BundleRoot;
use crate::types::DestDir;
use crate::types::SafePath;
use crate::types::SafeSymlink;

/// Write buffer used for every extracted file.
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// The outcome of a successful extraction.
#[derive(Debug, Clone)]
pub struct ExtractedBundle {
    /// Top-level directory of the extracted bundle.
    pub root: BundleRoot,
    /// Statistics and per-member warnings.
    pub report: ExtractionReport,
}

/// Extracts a validated archive into `dest` and locates its root.
///
/// `dest` is created if missing. Members are written under `dest` with
/// their stored relative paths; members that would escape `dest` are
/// skipped and recorded in the report. Re-extracting into a non-empty
/// `dest` overwrites conflicting files and links; existing directories are
/// kept.
///
/// The root is `dest/<segment>` where `<segment>` is the single distinct
/// first path segment across all extracted members.
///
/// # Errors
///
/// - `ExtractionFailed` if the archive cannot be read to the end, a write
///   fails, or no root directory exists afterwards
/// - `AmbiguousRoot` if members sit under more than one top-level segment
/// - `QuotaExceeded` if the archive exceeds the configured limits
///
/// # Examples
///
/// ```no_run
/// use diagarch_core::IngestConfig;
/// use diagarch_core::extract_bundle;
/// use diagarch_core::validate_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = validate_archive("sosreport-web01-2023-04-15-abcdef.tar.xz")?;
/// let extracted = extract_bundle(&handle, "/var/tmp/work", &IngestConfig::default())?;
/// println!("bundle root: {}", extracted.root.as_path().display());
/// # Ok(())
/// # }
/// ```
pub fn extract_bundle<P: AsRef<Path>>(
    handle: &ArchiveHandle,
    dest: P,
    config: &IngestConfig,
) -> Result<ExtractedBundle> {
    let started = Instant::now();
    let archive_path = handle.path();
    let failed = |reason: String| IngestError::ExtractionFailed {
        path: archive_path.to_path_buf(),
        reason,
    };

    let dest = DestDir::create(dest.as_ref()).map_err(|e| failed(e.to_string()))?;
    info!(
        archive = %archive_path.display(),
        dest = %dest.as_path().display(),
        compression = %handle.compression(),
        "extracting bundle"
    );

    let mut archive = handle.open().map_err(|e| failed(e.to_string()))?;
    let entries = archive
        .entries()
        .map_err(|e| failed(format!("failed to read members: {e}")))?;

    let mut extractor = Extractor::new(dest, config);
    for entry in entries {
        let mut entry = entry.map_err(|e| failed(format!("failed to read member: {e}")))?;
        extractor.extract_entry(&mut entry).map_err(|e| match e {
            IngestError::Io(io) => failed(io.to_string()),
            other => other,
        })?;
    }

    let Extractor {
        dest,
        mut report,
        top_levels,
        ..
    } = extractor;

    let root = detect_root(&dest, &top_levels, archive_path)?;
    report.duration = started.elapsed();

    info!(
        root = %root.as_path().display(),
        entries = report.total_items(),
        files = report.files_extracted,
        directories = report.directories_created,
        symlinks = report.symlinks_created,
        bytes = report.bytes_written,
        skipped = report.entries_skipped,
        elapsed_ms = report.duration.as_millis(),
        "bundle extracted"
    );

    Ok(ExtractedBundle { root, report })
}

/// What happened to a single member.
enum Disposition {
    Written,
    Skipped(String),
}

struct Extractor<'a> {
    dest: DestDir,
    config: &'a IngestConfig,
    quota: QuotaTracker,
    report: ExtractionReport,
    top_levels: BTreeSet<OsString>,
}

impl<'a> Extractor<'a> {
    fn new(dest: DestDir, config: &'a IngestConfig) -> Self {
        Self {
            dest,
            config,
            quota: QuotaTracker::new(),
            report: ExtractionReport::new(),
            top_levels: BTreeSet::new(),
        }
    }

    fn extract_entry<R: Read>(&mut self, entry: &mut tar::Entry<'_, R>) -> Result<()> {
        let kind = entry.header().entry_type();
        if kind.is_pax_global_extensions()
            || kind.is_pax_local_extensions()
            || kind.is_gnu_longname()
            || kind.is_gnu_longlink()
        {
            return Ok(());
        }

        let raw = entry.path()?.into_owned();
        if raw
            .components()
            .all(|c| matches!(c, Component::CurDir | Component::RootDir))
        {
            debug!(member = %raw.display(), "ignoring archive self-reference");
            return Ok(());
        }

        let safe = match SafePath::validate(&raw, &self.dest, self.config) {
            Ok(safe) => safe,
            Err(e) if is_member_rejection(&e) => {
                self.skip(&raw, e.to_string());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let disposition = if kind.is_file() || kind.is_contiguous() || kind.is_gnu_sparse() {
            self.write_file(entry, &safe)?
        } else if kind.is_dir() {
            self.create_dir(&safe)?
        } else if kind.is_symlink() {
            self.create_symlink(entry, &safe)?
        } else if kind.is_hard_link() {
            self.create_hardlink(entry, &safe)?
        } else if kind.is_character_special() || kind.is_block_special() || kind.is_fifo() {
            Disposition::Skipped("device nodes and FIFOs are not extracted".into())
        } else {
            Disposition::Skipped(format!("unsupported entry type {kind:?}"))
        };

        match disposition {
            Disposition::Written => {
                if let Some(top) = safe.top_level() {
                    self.top_levels.insert(top.to_os_string());
                }
            }
            Disposition::Skipped(reason) => self.skip(&raw, reason),
        }
        Ok(())
    }

    fn write_file<R: Read>(
        &mut self,
        entry: &mut tar::Entry<'_, R>,
        safe: &SafePath,
    ) -> Result<Disposition> {
        let out = self.dest.join(safe);
        if let Some(reason) = prepare_slot(&out)? {
            return Ok(Disposition::Skipped(reason));
        }

        self.quota.reserve_file(entry.size(), self.config)?;

        let file = File::create(&out)?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let written = std::io::copy(entry, &mut writer)?;
        writer.flush()?;
        drop(writer);

        if self.config.preserve_permissions
            && let Ok(mode) = entry.header().mode()
        {
            set_mode(&out, mode)?;
        }

        self.report.files_extracted += 1;
        self.report.bytes_written = self.report.bytes_written.saturating_add(written);
        Ok(Disposition::Written)
    }

    fn create_dir(&mut self, safe: &SafePath) -> Result<Disposition> {
        let out = self.dest.join(safe);
        match std::fs::symlink_metadata(&out) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => std::fs::remove_file(&out)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.quota.reserve_entry(self.config)?;
        match std::fs::create_dir_all(&out) {
            Ok(()) => {}
            Err(e) if is_blocked(&e) => {
                return Ok(Disposition::Skipped(format!(
                    "cannot create directory: {e}"
                )));
            }
            Err(e) => return Err(e.into()),
        }

        self.report.directories_created += 1;
        Ok(Disposition::Written)
    }

    fn create_symlink<R: Read>(
        &mut self,
        entry: &tar::Entry<'_, R>,
        safe: &SafePath,
    ) -> Result<Disposition> {
        let Some(target) = entry.link_name()? else {
            return Ok(Disposition::Skipped("symlink without a target".into()));
        };

        let symlink = match SafeSymlink::validate(safe, &target, &self.dest, self.config) {
            Ok(symlink) => symlink,
            Err(e) if is_member_rejection(&e) => return Ok(Disposition::Skipped(e.to_string())),
            Err(e) => return Err(e),
        };

        let out = self.dest.join(safe);
        if let Some(reason) = prepare_slot(&out)? {
            return Ok(Disposition::Skipped(reason));
        }

        self.quota.reserve_entry(self.config)?;
        if !create_symlink(&symlink, &out)? {
            return Ok(Disposition::Skipped(
                "symlinks are not supported on this platform".into(),
            ));
        }
        self.report.symlinks_created += 1;
        Ok(Disposition::Written)
    }

    fn create_hardlink<R: Read>(
        &mut self,
        entry: &tar::Entry<'_, R>,
        safe: &SafePath,
    ) -> Result<Disposition> {
        if !self.config.allow_hardlinks {
            return Ok(Disposition::Skipped("hardlinks not allowed".into()));
        }

        let Some(target) = entry.link_name()? else {
            return Ok(Disposition::Skipped("hardlink without a target".into()));
        };

        let source = match SafePath::validate(&target, &self.dest, self.config) {
            Ok(source) => self.dest.join(&source),
            Err(e) if is_member_rejection(&e) => {
                let escape = IngestError::HardlinkEscape {
                    path: safe.as_path().to_path_buf(),
                };
                return Ok(Disposition::Skipped(escape.to_string()));
            }
            Err(e) => return Err(e),
        };

        let out = self.dest.join(safe);
        if source == out {
            return Ok(Disposition::Skipped("hardlink points at itself".into()));
        }

        // A hardlinked symlink keeps its relative target but not its parent,
        // so only regular files may be linked.
        match std::fs::symlink_metadata(&source) {
            Ok(meta) if meta.is_file() => {}
            Ok(meta) if meta.file_type().is_symlink() => {
                let escape = IngestError::HardlinkEscape {
                    path: safe.as_path().to_path_buf(),
                };
                return Ok(Disposition::Skipped(format!("{escape}: target is a symlink")));
            }
            Ok(_) => {
                return Ok(Disposition::Skipped(
                    "hardlink target is not a regular file".into(),
                ));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Disposition::Skipped(format!(
                    "hardlink target not extracted: {}",
                    target.display()
                )));
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(reason) = prepare_slot(&out)? {
            return Ok(Disposition::Skipped(reason));
        }

        self.quota.reserve_entry(self.config)?;
        std::fs::hard_link(&source, &out)?;
        self.report.hardlinks_created += 1;
        Ok(Disposition::Written)
    }

    fn skip(&mut self, member: &Path, reason: String) {
        warn!(member = %member.display(), %reason, "skipping archive member");
        self.report
            .skip(format!("skipped {}: {reason}", member.display()));
    }
}

/// Makes `out` writable for a non-directory member.
///
/// Parents are created and any existing non-directory at `out` is removed,
/// so a stale link is replaced rather than written through. Returns a skip
/// reason if a directory or file is in the way.
fn prepare_slot(out: &Path) -> Result<Option<String>> {
    if let Some(parent) = out.parent() {
        match std::fs::create_dir_all(parent) {
            Ok(()) => {}
            Err(e) if is_blocked(&e) => {
                return Ok(Some(format!("cannot create parent directory: {e}")));
            }
            Err(e) => return Err(e.into()),
        }
    }

    match std::fs::symlink_metadata(out) {
        Ok(meta) if meta.is_dir() => Ok(Some("a directory is in the way".into())),
        Ok(_) => {
            std::fs::remove_file(out)?;
            Ok(None)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Applies the permission bits of a tar mode, without setuid/setgid/sticky.
#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o777))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

/// Returns `false` where the platform cannot create the link.
#[cfg(unix)]
fn create_symlink(symlink: &SafeSymlink, out: &Path) -> std::io::Result<bool> {
    std::os::unix::fs::symlink(symlink.target_path(), out)?;
    Ok(true)
}

#[cfg(not(unix))]
fn create_symlink(_symlink: &SafeSymlink, _out: &Path) -> std::io::Result<bool> {
    Ok(false)
}

/// A non-directory occupies a path component that must be a directory.
fn is_blocked(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::AlreadyExists | ErrorKind::NotADirectory)
}

/// Errors that reject one member without failing the extraction.
fn is_member_rejection(err: &IngestError) -> bool {
    matches!(
        err,
        IngestError::PathTraversal { .. }
            | IngestError::SymlinkEscape { .. }
            | IngestError::HardlinkEscape { .. }
            | IngestError::SecurityViolation { .. }
    )
}
