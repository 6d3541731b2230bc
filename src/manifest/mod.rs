//! Bundle manifests and tracked file state
//!
//! A [`BundleManifest`] records what a bundle could install (its canonical
//! file list) and what installs of it actually produced on disk (its
//! installed file list).

pub mod builder;
pub mod store;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use builder::{ManifestBuilder, build_manifest};
pub use store::ManifestStore;

/// One tracked file.
///
/// Identity is the whole tuple: a file replaced in place with a different
/// size, time, or hash is a different entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStateEntry {
    /// Normalized project-relative path
    pub path: String,

    /// Hex digest of the file contents, when hashing was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    /// Modification time in nanoseconds since the Unix epoch
    pub modified_time: i64,

    /// Size in bytes
    pub size: u64,
}

/// One distributable bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    /// Bundle title, the merge key
    pub title: String,

    /// Metadata blob embedded in the container
    #[serde(default)]
    pub raw_metadata: String,

    /// Every path the bundle could install, sorted and deduplicated
    #[serde(default)]
    pub canonical_file_list: Vec<String>,

    /// Files produced by installs of this bundle
    #[serde(default)]
    pub installed_file_list: Vec<FileStateEntry>,
}

impl BundleManifest {
    /// Create a manifest with a canonicalized file list
    pub fn new(
        title: impl Into<String>,
        raw_metadata: impl Into<String>,
        files: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            title: title.into(),
            raw_metadata: raw_metadata.into(),
            canonical_file_list: canonicalize(files),
            installed_file_list: Vec::new(),
        }
    }

    /// Whether `path` is part of the canonical file list
    pub fn contains(&self, path: &str) -> bool {
        self.canonical_file_list
            .binary_search_by(|p| p.as_str().cmp(path))
            .is_ok()
    }

    /// Paths an uninstall should act on.
    ///
    /// The installed list when an install was ever diffed, the canonical
    /// list otherwise.
    pub fn tracked_paths(&self) -> Vec<String> {
        if self.installed_file_list.is_empty() {
            self.canonical_file_list.clone()
        } else {
            canonicalize(self.installed_file_list.iter().map(|e| e.path.clone()))
        }
    }

    /// Fold the installed history of `previous` into this manifest
    pub fn merge_from(&mut self, previous: &BundleManifest) {
        self.installed_file_list = merge_installed(
            &previous.installed_file_list,
            std::mem::take(&mut self.installed_file_list),
        );
    }
}

/// Sort and deduplicate a path list
pub fn canonicalize(files: impl IntoIterator<Item = String>) -> Vec<String> {
    files
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Union two installed lists under full entry equality, sorted
pub fn merge_installed(
    existing: &[FileStateEntry],
    new: Vec<FileStateEntry>,
) -> Vec<FileStateEntry> {
    existing
        .iter()
        .cloned()
        .chain(new)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
