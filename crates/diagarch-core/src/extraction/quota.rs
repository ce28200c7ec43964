//! Extraction quota tracking.

use crate::IngestConfig;
use crate::IngestError;
use crate::Result;
use crate::error::QuotaResource;

/// Tracks resource usage during extraction.
///
/// Checks run before an entry is created so an over-quota member never
/// leaves a partial file behind. The count covers every materialized entry:
/// files, directories and links.
#[derive(Debug, Default)]
pub(crate) struct QuotaTracker {
    entries: usize,
    bytes: u64,
}

impl QuotaTracker {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Counts one directory or link against the entry limit.
    pub(crate) fn reserve_entry(&mut self, config: &IngestConfig) -> Result<()> {
        self.entries = self.next_entry(config)?;
        Ok(())
    }

    /// Reserves room for one file of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns `QuotaExceeded` if any limit would be crossed.
    pub(crate) fn reserve_file(&mut self, size: u64, config: &IngestConfig) -> Result<()> {
        if size > config.max_file_size {
            return Err(IngestError::QuotaExceeded {
                resource: QuotaResource::FileSize {
                    size,
                    max: config.max_file_size,
                },
            });
        }

        let entries = self.next_entry(config)?;
        let bytes = self
            .bytes
            .checked_add(size)
            .ok_or(IngestError::QuotaExceeded {
                resource: QuotaResource::IntegerOverflow,
            })?;
        if bytes > config.max_total_size {
            return Err(IngestError::QuotaExceeded {
                resource: QuotaResource::TotalSize {
                    current: bytes,
                    max: config.max_total_size,
                },
            });
        }

        self.entries = entries;
        self.bytes = bytes;
        Ok(())
    }

    fn next_entry(&self, config: &IngestConfig) -> Result<usize> {
        let entries = self.entries + 1;
        if entries > config.max_file_count {
            return Err(IngestError::QuotaExceeded {
                resource: QuotaResource::FileCount {
                    current: entries,
                    max: config.max_file_count,
                },
            });
        }
        Ok(entries)
    }

    #[cfg(test)]
    fn entries(&self) -> usize {
        self.entries
    }

    #[cfg(test)]
    fn bytes(&self) -> u64 {
        self.bytes
    }
}
