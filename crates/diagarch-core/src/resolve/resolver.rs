//! Fallback-chain resolution of categories against an extracted bundle.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use super::CategoryDataset;
use super::CategoryResult;
use super::CategorySpec;
use super::PathCandidate;
use super::matches_pattern;
use crate::types::BundleRoot;

/// Resolves category tables against one bundle.
///
/// Resolution never fails. Missing files, unreadable files and non-UTF-8
/// content are logged at `debug` and treated as absent.
///
/// For each [`CategorySpec`]:
///
/// - exact candidates are tried in order and the first one that exists and
///   reads successfully is stored under the category name; the rest of the
///   chain is not consulted
/// - every glob candidate is expanded in full and each matching regular file
///   is stored under its file name
/// - on a key collision the exact-chain entry wins, then the earliest glob
/// - candidates that try to leave the bundle (`..`, absolute paths) are
///   ignored with a warning, as are hits that resolve through a link to a
///   file outside the root
///
/// # Examples
///
/// ```no_run
/// use diagarch_core::BundleRoot;
/// use diagarch_core::resolve::CategoryPathResolver;
/// use diagarch_core::resolve::CategorySpec;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = CategoryPathResolver::new(BundleRoot::open("/var/tmp/sosreport-web01")?);
/// let mounts = resolver.resolve(
///     &CategorySpec::new("mounts")
///         .exact("proc/mounts")
///         .exact("sos_commands/filesys/mount_-l"),
/// );
/// if let Some(text) = mounts.get("mounts") {
///     println!("{} mount lines", text.lines().count());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CategoryPathResolver {
    root: BundleRoot,
}

impl CategoryPathResolver {
    /// Creates a resolver for the bundle at `root`.
    #[must_use]
    pub fn new(root: BundleRoot) -> Self {
        Self { root }
    }

    /// Returns the bundle root.
    #[must_use]
    pub fn root(&self) -> &BundleRoot {
        &self.root
    }

    /// Resolves one category.
    #[must_use]
    pub fn resolve(&self, spec: &CategorySpec) -> CategoryResult {
        let mut result = CategoryResult::new();
        let mut globbed = Vec::new();
        let mut exact_found = false;

        for candidate in spec.candidates() {
            if exact_found && !candidate.is_glob() {
                continue;
            }
            let Some(location) = self.checked(spec.name(), candidate.location()) else {
                continue;
            };

            match candidate {
                PathCandidate::Exact { max_bytes, .. } => {
                    if let Some(text) = read_capped(&self.root, &location, *max_bytes) {
                        result.insert_if_absent(spec.name().to_string(), text);
                        exact_found = true;
                    }
                }
                PathCandidate::Glob {
                    pattern, max_bytes, ..
                } => globbed.extend(expand(&self.root, &location, pattern, *max_bytes)),
            }
        }

        for (name, text) in globbed {
            if !result.insert_if_absent(name.clone(), text) {
                debug!(category = spec.name(), key = %name, "duplicate key, keeping first");
            }
        }

        debug!(
            category = spec.name(),
            entries = result.len(),
            "category resolved"
        );
        result
    }

    /// Resolves a table of categories.
    ///
    /// Every spec gets an entry, empty if nothing was found. If two specs
    /// share a name, the first one is kept.
    #[must_use]
    pub fn resolve_all(&self, specs: &[CategorySpec]) -> CategoryDataset {
        let mut dataset = CategoryDataset::new();
        for spec in specs {
            if !dataset.insert_if_absent(spec.name().to_string(), self.resolve(spec)) {
                warn!(category = spec.name(), "duplicate category in table, ignoring");
            }
        }
        dataset
    }

    /// Joins a candidate to the root, refusing anything but plain relative
    /// components.
    fn checked(&self, category: &str, relative: &Path) -> Option<PathBuf> {
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if plain {
            Some(self.root.join(relative))
        } else {
            warn!(
                category,
                candidate = %relative.display(),
                "ignoring candidate outside the bundle"
            );
            None
        }
    }
}

/// Lists regular files in `dir` whose names match `pattern`, in name order,
/// with their capped content.
fn expand(
    root: &BundleRoot,
    dir: &Path,
    pattern: &str,
    max_bytes: Option<usize>,
) -> Vec<(String, String)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "glob directory not readable");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| matches_pattern(name, pattern))
        .collect();
    names.sort();

    names
        .into_iter()
        .filter_map(|name| {
            let path = dir.join(&name);
            if !path.is_file() {
                return None;
            }
            read_capped(root, &path, max_bytes).map(|text| (name, text))
        })
        .collect()
}

/// Reads a whole file as UTF-8, then applies the cap.
///
/// The file is read through its canonical path, which must lie under `root`.
fn read_capped(root: &BundleRoot, path: &Path, max_bytes: Option<usize>) -> Option<String> {
    let real = match path.canonicalize() {
        Ok(real) => real,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "candidate not readable");
            return None;
        }
    };
    if !real.starts_with(root.as_path()) {
        warn!(
            path = %path.display(),
            target = %real.display(),
            "ignoring candidate that resolves outside the bundle"
        );
        return None;
    }

    match std::fs::read_to_string(&real) {
        Ok(text) => Some(match max_bytes {
            Some(limit) => truncate_at_boundary(text, limit),
            None => text,
        }),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "candidate not readable");
            None
        }
    }
}

/// Cuts `text` to at most `limit` bytes, backing off to a char boundary.
fn truncate_at_boundary(mut text: String, limit: usize) -> String {
    if text.len() > limit {
        let mut cut = limit;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}
