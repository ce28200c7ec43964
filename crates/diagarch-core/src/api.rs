//! High-level ingestion API.

use std::path::Path;
use std::path::PathBuf;

use tracing::info;

use crate::ArchiveHandle;
use crate::BundleRoot;
use crate::BundleTimestamp;
use crate::ExtractionReport;
use crate::IngestConfig;
use crate::IngestError;
use crate::Result;
use crate::extract_bundle;
use crate::resolve::CategoryDataset;
use crate::resolve::CategoryPathResolver;
use crate::resolve::CategoryResult;
use crate::resolve::CategorySpec;
use crate::resolve_timestamp;
use crate::validate_archive;

/// An ingested diagnostic bundle, ready for category resolution.
#[derive(Debug, Clone)]
pub struct Bundle {
    handle: ArchiveHandle,
    resolver: CategoryPathResolver,
    timestamp: BundleTimestamp,
    report: ExtractionReport,
}

impl Bundle {
    /// Returns the validated source archive.
    #[must_use]
    pub fn handle(&self) -> &ArchiveHandle {
        &self.handle
    }

    /// Returns the extracted bundle root.
    #[must_use]
    pub fn root(&self) -> &BundleRoot {
        self.resolver.root()
    }

    /// Returns the collection date label.
    #[must_use]
    pub fn timestamp(&self) -> &BundleTimestamp {
        &self.timestamp
    }

    /// Returns the extraction report.
    #[must_use]
    pub fn report(&self) -> &ExtractionReport {
        &self.report
    }

    /// Returns a resolver bound to this bundle.
    #[must_use]
    pub fn resolver(&self) -> &CategoryPathResolver {
        &self.resolver
    }

    /// Resolves one category against this bundle.
    #[must_use]
    pub fn resolve(&self, spec: &CategorySpec) -> CategoryResult {
        self.resolver.resolve(spec)
    }

    /// Resolves a table of categories against this bundle.
    #[must_use]
    pub fn resolve_all(&self, specs: &[CategorySpec]) -> CategoryDataset {
        self.resolver.resolve_all(specs)
    }
}

/// Validates, extracts and dates an archive in one call.
///
/// The bundle is extracted under `workdir`, which is created if missing.
/// The date is read from `archive_path` as given, so a link named after the
/// bundle is dated by its own name rather than its target's.
///
/// # Errors
///
/// Returns any error from [`validate_archive`] or [`extract_bundle`].
/// Dating never fails.
///
/// # Examples
///
/// ```no_run
/// use diagarch_core::IngestConfig;
/// use diagarch_core::ingest_archive;
/// use diagarch_core::resolve::CategorySpec;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bundle = ingest_archive(
///     "sosreport-web01-2023-04-15-abcdef.tar.xz",
///     "/var/tmp/work",
///     &IngestConfig::default(),
/// )?;
/// let fstab = bundle.resolve(&CategorySpec::new("fstab").exact("etc/fstab"));
/// println!("{} collected {}: {} entries", bundle.root().as_path().display(), bundle.timestamp(), fstab.len());
/// # Ok(())
/// # }
/// ```
pub fn ingest_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    workdir: Q,
    config: &IngestConfig,
) -> Result<Bundle> {
    let archive_path = archive_path.as_ref();
    let handle = validate_archive(archive_path)?;
    let extracted = extract_bundle(&handle, workdir, config)?;
    let timestamp = resolve_timestamp(archive_path);

    info!(
        archive = %handle.path().display(),
        root = %extracted.root.as_path().display(),
        %timestamp,
        "bundle ingested"
    );

    Ok(Bundle {
        handle,
        resolver: CategoryPathResolver::new(extracted.root),
        timestamp,
        report: extracted.report,
    })
}

/// Builder for configuring an ingestion run.
///
/// # Examples
///
/// ```no_run
/// use diagarch_core::BundleBuilder;
/// use diagarch_core::IngestConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bundle = BundleBuilder::new()
///     .archive("scc_web01_230415_1200.txz")
///     .workdir("/var/tmp/work")
///     .config(IngestConfig::strict())
///     .ingest()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct BundleBuilder {
    archive_path: Option<PathBuf>,
    workdir: Option<PathBuf>,
    config: Option<IngestConfig>,
}

impl BundleBuilder {
    /// Creates a new `BundleBuilder`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the archive file path.
    #[must_use]
    pub fn archive<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.archive_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory the bundle is extracted under.
    #[must_use]
    pub fn workdir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.workdir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the ingestion configuration.
    #[must_use]
    pub fn config(mut self, config: IngestConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Runs the ingestion.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the archive or workdir is not set, or any
    /// error from [`ingest_archive`].
    pub fn ingest(self) -> Result<Bundle> {
        let archive_path = self
            .archive_path
            .ok_or_else(|| IngestError::InvalidInput("archive path not set".to_string()))?;
        let workdir = self
            .workdir
            .ok_or_else(|| IngestError::InvalidInput("workdir not set".to_string()))?;
        let config = self.config.unwrap_or_default();

        ingest_archive(archive_path, workdir, &config)
    }
}
