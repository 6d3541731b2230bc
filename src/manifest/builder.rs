//! Candidate manifest construction from a container file

use std::path::Path;

use crate::container::{read_container_catalog, read_container_metadata};
use crate::error::{BundleError, Result};

use super::BundleManifest;

/// Builds a [`BundleManifest`] from a container without extracting it
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    meta_extension: String,
}

impl ManifestBuilder {
    pub fn new(meta_extension: impl Into<String>) -> Self {
        Self {
            meta_extension: meta_extension.into(),
        }
    }

    /// Read the container's metadata and catalog into a candidate manifest.
    ///
    /// The installed file list of the result is always empty.
    pub fn build(&self, container: &Path) -> Result<BundleManifest> {
        let source = container.display().to_string();

        let metadata = match read_container_metadata(container) {
            Ok(metadata) => metadata,
            Err(e) if e.is_recoverable() => {
                tracing::debug!(container = %source, "no metadata subfield, using file name");
                String::new()
            }
            Err(e) => return Err(e),
        };

        let title = if metadata.trim().is_empty() {
            title_from_file_stem(container)
        } else {
            extract_title(&metadata, &source)?
        };

        let catalog = read_container_catalog(container)?;
        let files = catalog.file_list(&self.meta_extension);
        tracing::debug!(title = %title, files = files.len(), "built candidate manifest");

        Ok(BundleManifest::new(title, metadata, files))
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new(".meta")
    }
}

/// Build a candidate manifest with the given metadata extension
pub fn build_manifest(container: &Path, meta_extension: &str) -> Result<BundleManifest> {
    ManifestBuilder::new(meta_extension).build(container)
}

/// Extract the bundle title from a metadata blob.
///
/// Parses the blob as a JSON object first; a blob that is not valid JSON is
/// scanned for a quoted `"title"` pair instead.
pub fn extract_title(metadata: &str, source: &str) -> Result<String> {
    let title = match serde_json::from_str::<serde_json::Value>(metadata) {
        Ok(value) => value
            .get("title")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
        Err(_) => scan_title(metadata),
    };

    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BundleError::TitleNotFound {
            path: source.to_string(),
        })
}

/// Find `"title"` followed by `:` and a quoted string
fn scan_title(metadata: &str) -> Option<String> {
    let mut rest = metadata;
    while let Some(pos) = rest.find("\"title\"") {
        rest = &rest[pos + "\"title\"".len()..];
        let Some(value) = rest.trim_start().strip_prefix(':') else {
            continue;
        };
        let Some(value) = value.trim_start().strip_prefix('"') else {
            continue;
        };

        let mut title = String::new();
        let mut chars = value.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => return Some(title),
                '\\' => title.extend(chars.next()),
                c => title.push(c),
            }
        }
        return None;
    }
    None
}

fn title_from_file_stem(container: &Path) -> String {
    container
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
