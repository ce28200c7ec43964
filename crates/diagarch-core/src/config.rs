//! Ingestion configuration.

/// Limits and policy applied while extracting a diagnostic bundle.
///
/// Archive content is untrusted input. Path sandboxing is always on; the
/// knobs here control how much an archive may write and which link types
/// are materialized.
///
/// # Examples
///
/// ```
/// use diagarch_core::IngestConfig;
///
/// let config = IngestConfig::default()
///     .with_max_total_size(4 * 1024 * 1024 * 1024)
///     .with_symlinks(false);
/// assert!(!config.allow_symlinks);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Maximum size for a single file in bytes.
    pub max_file_size: u64,

    /// Maximum total size for all extracted files in bytes.
    pub max_total_size: u64,

    /// Maximum number of entries (files, directories and links) that can
    /// be extracted.
    pub max_file_count: usize,

    /// Maximum path depth allowed.
    pub max_path_depth: usize,

    /// Materialize symlinks whose target stays inside the destination.
    pub allow_symlinks: bool,

    /// Materialize hardlinks whose target stays inside the destination.
    pub allow_hardlinks: bool,

    /// Apply file modes recorded in the archive (masked to `0o777`).
    pub preserve_permissions: bool,
}

impl Default for IngestConfig {
    /// Defaults sized for real sosreport/supportconfig bundles.
    ///
    /// - `max_file_size`: 2 GiB
    /// - `max_total_size`: 16 GiB
    /// - `max_file_count`: 1,000,000
    /// - `max_path_depth`: 64
    /// - `allow_symlinks`: true
    /// - `allow_hardlinks`: true
    /// - `preserve_permissions`: false
    fn default() -> Self {
        Self {
            max_file_size: 2 * 1024 * 1024 * 1024,
            max_total_size: 16 * 1024 * 1024 * 1024,
            max_file_count: 1_000_000,
            max_path_depth: 64,
            allow_symlinks: true,
            allow_hardlinks: true,
            preserve_permissions: false,
        }
    }
}

impl IngestConfig {
    /// Strict configuration for bundles from unknown sources.
    ///
    /// Links are dropped and quotas are tightened to 256 MiB per file and
    /// 2 GiB overall.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_file_size: 256 * 1024 * 1024,
            max_total_size: 2 * 1024 * 1024 * 1024,
            max_file_count: 200_000,
            max_path_depth: 32,
            allow_symlinks: false,
            allow_hardlinks: false,
            preserve_permissions: false,
        }
    }

    /// Sets the single file size limit.
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Sets the total size limit.
    #[must_use]
    pub fn with_max_total_size(mut self, bytes: u64) -> Self {
        self.max_total_size = bytes;
        self
    }

    /// Sets the file count limit.
    #[must_use]
    pub fn with_max_file_count(mut self, count: usize) -> Self {
        self.max_file_count = count;
        self
    }

    /// Sets the maximum path depth.
    #[must_use]
    pub fn with_max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    /// Enables or disables symlink materialization.
    #[must_use]
    pub fn with_symlinks(mut self, allow: bool) -> Self {
        self.allow_symlinks = allow;
        self
    }

    /// Enables or disables hardlink materialization.
    #[must_use]
    pub fn with_hardlinks(mut self, allow: bool) -> Self {
        self.allow_hardlinks = allow;
        self
    }

    /// Enables or disables permission preservation.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }
}
