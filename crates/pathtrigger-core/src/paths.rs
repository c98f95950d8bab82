//! Changed paths reported by a diff source.

use crate::ports::DiffEntry;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// A slash-separated file path, kept verbatim as the diff source reported it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangedPath(String);

impl ChangedPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Literal string prefix test. A path equal to the prefix matches.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl Borrow<str> for ChangedPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether before-state paths count as changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovedPathPolicy {
    /// Only after-state paths count; deletions contribute nothing.
    #[default]
    Skip,
    /// Before-state paths count too, so a deletion contributes its old path
    /// and a rename contributes both of its paths.
    IncludeBeforePath,
}

impl RemovedPathPolicy {
    /// Paths an entry contributes under this policy.
    pub fn select<'a>(self, entry: &'a DiffEntry) -> impl Iterator<Item = &'a str> {
        let before = match self {
            RemovedPathPolicy::IncludeBeforePath => entry.before_path.as_deref(),
            RemovedPathPolicy::Skip => None,
        };
        entry.after_path.as_deref().into_iter().chain(before)
    }
}

/// Deduplicated changed paths for one commit range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet {
    paths: BTreeSet<ChangedPath>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path. Returns false if it was already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(ChangedPath::new(path))
    }

    /// Add every path a diff page entry contributes under `policy`.
    /// Returns how many entries were skipped.
    pub fn extend_from_entries(&mut self, entries: &[DiffEntry], policy: RemovedPathPolicy) -> usize {
        let mut skipped = 0;
        for entry in entries {
            let mut contributed = false;
            for path in policy.select(entry) {
                self.insert(path);
                contributed = true;
            }
            if !contributed {
                skipped += 1;
            }
        }
        skipped
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &ChangedPath> {
        self.paths.iter()
    }

    /// First path (in sorted order) that starts with `prefix`.
    pub fn first_with_prefix(&self, prefix: &str) -> Option<&ChangedPath> {
        self.paths.iter().find(|p| p.has_prefix(prefix))
    }
}

impl<S: Into<String>> FromIterator<S> for PathSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PathSet::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}
