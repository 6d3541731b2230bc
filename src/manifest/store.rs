//! Permanent manifest store
//!
//! One pretty-printed JSON record per installed bundle under
//! `.bundlekeeper/manifests/`, named after the path-safe form of its title
//! plus a short digest of the exact title, so titles that sanitize alike or
//! differ only in case never share a record.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BundleError, Result, file_read_failed};
use crate::path_utils::make_path_safe;
use crate::project::Project;
use crate::project::storage::{read_json, remove_if_exists, write_json};

use super::BundleManifest;

/// Record file extension
const RECORD_EXTENSION: &str = "json";

/// Hex digits of the title digest in a record name
const TITLE_DIGEST_LEN: usize = 12;

/// File name of the record for `title`
pub fn record_file_name(title: &str) -> String {
    let digest = blake3::hash(title.as_bytes()).to_hex();
    format!(
        "{}-{}.{RECORD_EXTENSION}",
        make_path_safe(title),
        &digest.as_str()[..TITLE_DIGEST_LEN]
    )
}

/// Reads and writes manifest records of one project
#[derive(Debug, Clone)]
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store of the given project
    pub fn for_project(project: &Project) -> Self {
        Self::new(project.manifests_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `title`
    pub fn record_path(&self, title: &str) -> PathBuf {
        self.dir.join(record_file_name(title))
    }

    /// Whether a record exists for `title`
    pub fn contains(&self, title: &str) -> bool {
        self.record_path(title).is_file()
    }

    /// Load the record for `title`, `None` when not installed.
    ///
    /// A record at that path holding another title is an error.
    pub fn load(&self, title: &str) -> Result<Option<BundleManifest>> {
        let path = self.record_path(title);
        let Some(manifest) = read_json::<BundleManifest>(&path)? else {
            return Ok(None);
        };
        if manifest.title != title {
            return Err(file_read_failed(
                path.display().to_string(),
                format!("record belongs to bundle '{}', not '{title}'", manifest.title),
            ));
        }
        Ok(Some(manifest))
    }

    /// Load the record for `title`, failing when not installed
    pub fn get(&self, title: &str) -> Result<BundleManifest> {
        self.load(title)?.ok_or_else(|| BundleError::ManifestNotFound {
            title: title.to_string(),
        })
    }

    /// Load every record, sorted by title
    pub fn list(&self) -> Result<Vec<BundleManifest>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(file_read_failed(self.dir.display().to_string(), e.to_string())),
        };

        let mut manifests = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(manifest) = read_json::<BundleManifest>(&path)? {
                manifests.push(manifest);
            }
        }

        manifests.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(manifests)
    }

    /// Atomically write the record for `manifest.title`
    pub fn save(&self, manifest: &BundleManifest) -> Result<PathBuf> {
        let path = self.record_path(&manifest.title);
        write_json(&path, manifest)?;
        tracing::debug!(title = %manifest.title, path = %path.display(), "saved manifest");
        Ok(path)
    }

    /// Remove the record for `title`; returns whether one existed
    pub fn remove(&self, title: &str) -> Result<bool> {
        remove_if_exists(&self.record_path(title))
    }
}
