//! Extraction reporting.

use std::time::Duration;

/// Report of a bundle extraction.
///
/// Skipped entries are not failures: each one leaves a line in `warnings`
/// and bumps `entries_skipped`.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directories created.
    pub directories_created: usize,

    /// Number of symlinks created.
    pub symlinks_created: usize,

    /// Number of hardlinks created.
    pub hardlinks_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Duration of the extraction.
    pub duration: Duration,

    /// Number of members rejected or not materialized.
    pub entries_skipped: usize,

    /// One message per skipped member.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a skipped member.
    pub fn skip(&mut self, message: String) {
        self.entries_skipped += 1;
        self.warnings.push(message);
    }

    /// Returns total number of items materialized.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted
            + self.directories_created
            + self.symlinks_created
            + self.hardlinks_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
