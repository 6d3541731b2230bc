//! Built-in unpacker
//!
//! Materializes a bundle without an external importer. The first pass over
//! the archive learns each hash directory's original-case pathname, the
//! second copies `asset` and `asset.meta` payloads into place.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;

use crate::container::open;
use crate::container::tar::{ASSET_MARKER, META_MARKER, PATHNAME_MARKER, first_line, split_marker};
use crate::error::{Result, file_write_failed, truncated_archive};
use crate::path_utils::{meta_path_for, to_forward_slashes};

use super::{ExtractionEvent, Extractor};

#[derive(Debug, Default)]
struct Bucket {
    pathname: Option<String>,
    has_asset: bool,
}

/// Unpacks bundle payloads into the project tree
#[derive(Debug, Clone)]
pub struct UnpackExtractor {
    root: PathBuf,
    meta_extension: String,
}

impl UnpackExtractor {
    pub fn new(root: impl Into<PathBuf>, meta_extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            meta_extension: meta_extension.into(),
        }
    }

    /// Unpack `container`, returning the number of files written
    pub fn unpack(&self, container: &Path) -> Result<usize> {
        let source = container.display().to_string();
        let buckets = self.read_buckets(container, &source)?;

        let mut archive = tar::Archive::new(GzDecoder::new(open(container)?));
        let mut written = 0;
        for entry in archive.entries().map_err(|e| truncated_archive(&source, e.to_string()))? {
            let mut entry = entry.map_err(|e| truncated_archive(&source, e.to_string()))?;
            let path = entry_path(&entry).map_err(|e| truncated_archive(&source, e.to_string()))?;
            let Some((hash, marker)) = split_marker(&path) else {
                continue;
            };
            let Some(pathname) = buckets.get(hash).and_then(|b| b.pathname.as_deref()) else {
                continue;
            };

            let target = match marker {
                ASSET_MARKER => pathname.to_string(),
                META_MARKER => meta_path_for(pathname, &self.meta_extension),
                _ => continue,
            };
            let Some(target) = self.target(&target) else {
                tracing::warn!(pathname, "skipping entry outside the project");
                continue;
            };

            write_entry(&mut entry, &target)?;
            written += 1;
        }

        for bucket in buckets.values().filter(|b| !b.has_asset) {
            if let Some(dir) = bucket.pathname.as_deref().and_then(|p| self.target(p)) {
                fs::create_dir_all(&dir)
                    .map_err(|e| file_write_failed(dir.display().to_string(), e.to_string()))?;
            }
        }

        tracing::debug!(container = %source, files = written, "unpacked bundle");
        Ok(written)
    }

    fn read_buckets(&self, container: &Path, source: &str) -> Result<HashMap<String, Bucket>> {
        let mut buckets: HashMap<String, Bucket> = HashMap::new();
        let mut archive = tar::Archive::new(GzDecoder::new(open(container)?));

        for entry in archive.entries().map_err(|e| truncated_archive(source, e.to_string()))? {
            let mut entry = entry.map_err(|e| truncated_archive(source, e.to_string()))?;
            let path = entry_path(&entry).map_err(|e| truncated_archive(source, e.to_string()))?;
            let Some((hash, marker)) = split_marker(&path) else {
                continue;
            };
            let bucket = buckets.entry(hash.to_string()).or_default();
            match marker {
                ASSET_MARKER => bucket.has_asset = true,
                PATHNAME_MARKER => {
                    let mut payload = Vec::new();
                    entry
                        .read_to_end(&mut payload)
                        .map_err(|e| truncated_archive(source, e.to_string()))?;
                    let pathname = first_line(&payload).trim().replace('\\', "/");
                    bucket.pathname = Some(pathname);
                }
                _ => {}
            }
        }

        Ok(buckets)
    }

    /// Absolute target of a bundle pathname, `None` when it would escape the root
    fn target(&self, pathname: &str) -> Option<PathBuf> {
        let relative = Path::new(pathname.trim_start_matches("./"));
        let safe = !pathname.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        safe.then(|| self.root.join(relative))
    }
}

impl Extractor for UnpackExtractor {
    fn name(&self) -> &str {
        "unpack"
    }

    fn extract(&self, container: &Path, interactive: bool) -> ExtractionEvent {
        if interactive {
            tracing::debug!("built-in unpacker has no interactive mode");
        }
        match self.unpack(container) {
            Ok(_) => ExtractionEvent::Completed,
            Err(e) => ExtractionEvent::Failed(e.to_string()),
        }
    }
}

fn entry_path<R: Read>(entry: &tar::Entry<'_, R>) -> io::Result<String> {
    let path = to_forward_slashes(&entry.path()?);
    Ok(path.trim_start_matches("./").to_string())
}

fn write_entry<R: Read>(entry: &mut R, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| file_write_failed(parent.display().to_string(), e.to_string()))?;
    }
    let mut file = File::create(target)
        .map_err(|e| file_write_failed(target.display().to_string(), e.to_string()))?;
    io::copy(entry, &mut file)
        .map_err(|e| file_write_failed(target.display().to_string(), e.to_string()))?;
    Ok(())
}
