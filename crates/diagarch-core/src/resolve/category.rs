//! Category tables: where a logical artifact may live inside a bundle.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// One place a category's data may be found, relative to the bundle root.
///
/// # Examples
///
/// ```
/// use diagarch_core::resolve::PathCandidate;
///
/// let df = PathCandidate::exact("sos_commands/filesys/df_-al_-x_autofs");
/// let dumpe2fs = PathCandidate::glob("sos_commands/filesys", "dumpe2fs_*").with_max_bytes(5000);
/// assert_eq!(df.max_bytes(), None);
/// assert_eq!(dumpe2fs.max_bytes(), Some(5000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PathCandidate {
    /// A single file. Exact candidates of a category form a fallback chain.
    Exact {
        /// File path relative to the bundle root.
        path: PathBuf,
        /// Keep at most this many bytes of content.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_bytes: Option<usize>,
    },
    /// Every regular file in `dir` whose name matches `pattern`.
    Glob {
        /// Directory relative to the bundle root. Not searched recursively.
        dir: PathBuf,
        /// File name pattern with `*` and `?` wildcards.
        pattern: String,
        /// Keep at most this many bytes of each match.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_bytes: Option<usize>,
    },
}

impl PathCandidate {
    /// Creates an exact candidate without a size cap.
    #[must_use]
    pub fn exact(path: impl Into<PathBuf>) -> Self {
        Self::Exact {
            path: path.into(),
            max_bytes: None,
        }
    }

    /// Creates a glob candidate without a size cap.
    #[must_use]
    pub fn glob(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self::Glob {
            dir: dir.into(),
            pattern: pattern.into(),
            max_bytes: None,
        }
    }

    /// Caps the content kept from this candidate.
    #[must_use]
    pub fn with_max_bytes(mut self, limit: usize) -> Self {
        match &mut self {
            Self::Exact { max_bytes, .. } | Self::Glob { max_bytes, .. } => {
                *max_bytes = Some(limit);
            }
        }
        self
    }

    /// Returns the size cap, if any.
    #[must_use]
    pub fn max_bytes(&self) -> Option<usize> {
        match self {
            Self::Exact { max_bytes, .. } | Self::Glob { max_bytes, .. } => *max_bytes,
        }
    }

    /// Returns the path this candidate reads from: the file for an exact
    /// candidate, the directory for a glob.
    #[must_use]
    pub fn location(&self) -> &Path {
        match self {
            Self::Exact { path, .. } => path,
            Self::Glob { dir, .. } => dir,
        }
    }

    /// Returns `true` for glob candidates.
    #[must_use]
    pub fn is_glob(&self) -> bool {
        matches!(self, Self::Glob { .. })
    }
}

/// A logical category and the ordered places its data may be found.
///
/// Tables are owned by the caller; the library has no built-in knowledge of
/// any collection tool's layout. Specs deserialize from data, so a table
/// can live in a JSON or TOML file as well as in code.
///
/// # Examples
///
/// ```
/// use diagarch_core::resolve::CategorySpec;
///
/// let df = CategorySpec::new("df")
///     .exact("sos_commands/filesys/df_-al_-x_autofs")
///     .exact("df");
/// let xfs = CategorySpec::new("xfs_info").glob("sos_commands/xfs", "xfs_info_*");
///
/// assert_eq!(df.candidates().len(), 2);
/// assert_eq!(xfs.name(), "xfs_info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    name: String,
    #[serde(default)]
    candidates: Vec<PathCandidate>,
}

impl CategorySpec {
    /// Creates a category with no candidates.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidates: Vec::new(),
        }
    }

    /// Appends an exact candidate to the fallback chain.
    #[must_use]
    pub fn exact(self, path: impl Into<PathBuf>) -> Self {
        self.candidate(PathCandidate::exact(path))
    }

    /// Appends a glob candidate.
    #[must_use]
    pub fn glob(self, dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        self.candidate(PathCandidate::glob(dir, pattern))
    }

    /// Appends any candidate.
    #[must_use]
    pub fn candidate(mut self, candidate: PathCandidate) -> Self {
        self.candidates.push(candidate);
        self
    }

    /// Returns the category name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the candidates in declaration order.
    #[must_use]
    pub fn candidates(&self) -> &[PathCandidate] {
        &self.candidates
    }
}
