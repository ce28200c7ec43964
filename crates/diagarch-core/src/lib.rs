//! Diagnostic bundle ingestion and categorical path resolution.
//!
//! `diagarch-core` takes a compressed diagnostic archive (sosreport,
//! supportconfig and similar), validates and extracts it inside a sandbox,
//! locates the bundle's root directory, and resolves logical data
//! categories against it through ordered fallback chains of candidate
//! paths.
//!
//! # Examples
//!
//! ```no_run
//! use diagarch_core::IngestConfig;
//! use diagarch_core::ingest_archive;
//! use diagarch_core::resolve::CategorySpec;
//! use diagarch_core::resolve::PathCandidate;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bundle = ingest_archive(
//!     "sosreport-web01-2023-04-15-abcdef.tar.xz",
//!     "/var/tmp/work",
//!     &IngestConfig::default(),
//! )?;
//!
//! let table = [
//!     CategorySpec::new("mounts")
//!         .exact("proc/mounts")
//!         .exact("sos_commands/filesys/mount_-l"),
//!     CategorySpec::new("dumpe2fs").candidate(
//!         PathCandidate::glob("sos_commands/filesys", "dumpe2fs_*").with_max_bytes(5000),
//!     ),
//! ];
//! let dataset = bundle.resolve_all(&table);
//! for name in dataset.found() {
//!     println!("{name} collected {}", bundle.timestamp());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod config;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod report;
pub mod resolve;
pub mod timestamp;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::Bundle;
pub use api::BundleBuilder;
pub use api::ingest_archive;
pub use archive::ArchiveHandle;
pub use archive::validate_archive;
pub use config::IngestConfig;
pub use error::IngestError;
pub use error::QuotaResource;
pub use error::Result;
pub use extraction::ExtractedBundle;
pub use extraction::extract_bundle;
pub use formats::Compression;
pub use report::ExtractionReport;
pub use resolve::CategoryDataset;
pub use resolve::CategoryPathResolver;
pub use resolve::CategoryResult;
pub use resolve::CategorySpec;
pub use resolve::PathCandidate;
pub use timestamp::BundleTimestamp;
pub use timestamp::TimestampSource;
pub use timestamp::resolve_timestamp;
pub use types::BundleRoot;
