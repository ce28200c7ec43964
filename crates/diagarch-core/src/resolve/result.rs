//! Resolution results.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;

/// Text content found for one category, keyed by origin.
///
/// An exact-chain hit is keyed by the category name and each glob match by
/// its file name. Empty means nothing was found, which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryResult(BTreeMap<String, String>);

impl CategoryResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the content stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates `(key, content)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes the result, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }

    /// Stores `content` under `key` unless the key is already taken.
    pub(crate) fn insert_if_absent(&mut self, key: String, content: String) -> bool {
        match self.0.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(content);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }
}

impl IntoIterator for CategoryResult {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Results for a table of categories, keyed by category name.
///
/// Every requested category is present, with an empty result if nothing
/// was found, so "asked and absent" differs from "never asked".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryDataset(BTreeMap<String, CategoryResult>);

impl CategoryDataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the result for `category`.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&CategoryResult> {
        self.0.get(category)
    }

    /// Returns the number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no category was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates category names in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates `(category, result)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryResult)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the categories for which something was found.
    pub fn found(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, result)| !result.is_empty())
            .map(|(name, _)| name)
    }

    /// Adds a category result unless one is already present.
    pub(crate) fn insert_if_absent(&mut self, category: String, result: CategoryResult) -> bool {
        match self.0.entry(category) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(result);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }
}

impl IntoIterator for CategoryDataset {
    type Item = (String, CategoryResult);
    type IntoIter = btree_map::IntoIter<String, CategoryResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
