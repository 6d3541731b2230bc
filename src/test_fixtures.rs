//! Test fixtures and utilities for reducing test setup duplication.
//!
//! Provides helpers to create temp projects and to build bundle containers
//! byte-for-byte, so container, install, and uninstall tests share one way
//! of producing archives.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{BundleSpec, create_project, write_bundle};
//!
//! #[test]
//! fn my_test() {
//!     let (temp, project) = create_project();
//!     let bundle = BundleSpec::titled("Props").asset("Assets/Props/Crate.fbx", b"fbx");
//!     let container = write_bundle(temp.path(), "props.unitypackage", &bundle);
//! }
//! ```

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::GzBuilder;
use tempfile::TempDir;

use crate::container::gzip::METADATA_SUBFIELD_ID;
use crate::error::Result;
use crate::extractor::{ExtractionEvent, Extractor};
use crate::project::Project;
use crate::vcs::{FileStatus, VersionControl, operation_failed};

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Create a temp directory with a git repository initialized.
///
/// # Panics
///
/// Panics if the temp directory or git repository cannot be created.
#[must_use]
pub fn create_git_repo() -> (TempDir, PathBuf) {
    let temp = create_temp_dir();
    let path = temp.path().to_path_buf();
    git2::Repository::init(&path).expect("Failed to init git repository");
    (temp, path)
}

/// Create a temp project with an `Assets/` folder and initialized state directory.
///
/// # Panics
///
/// Panics if any step fails.
#[must_use]
pub fn create_project() -> (TempDir, Project) {
    let temp = create_temp_dir();
    std::fs::create_dir_all(temp.path().join("Assets")).expect("Failed to create Assets");
    let project = Project::init_or_open(temp.path()).expect("Failed to init project");
    (temp, project)
}

/// Create test files under a directory.
///
/// # Panics
///
/// Panics if any file cannot be created.
pub fn create_test_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

/// One raw TAR entry
pub struct TarEntry {
    path: String,
    data: Vec<u8>,
    is_dir: bool,
}

impl TarEntry {
    pub fn file(path: &str, data: &[u8]) -> Self {
        Self {
            path: path.to_string(),
            data: data.to_vec(),
            is_dir: false,
        }
    }

    pub fn dir(path: &str) -> Self {
        Self {
            path: path.to_string(),
            data: Vec::new(),
            is_dir: true,
        }
    }
}

/// Build an uncompressed TAR stream, terminator included.
///
/// # Panics
///
/// Panics if the archive cannot be built.
#[must_use]
pub fn raw_tar(entries: &[TarEntry]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for entry in entries {
        let mut header = tar::Header::new_ustar();
        header
            .set_path(&entry.path)
            .expect("Failed to set entry path");
        header.set_size(entry.data.len() as u64);
        header.set_mode(if entry.is_dir { 0o755 } else { 0o644 });
        header.set_entry_type(if entry.is_dir {
            tar::EntryType::Directory
        } else {
            tar::EntryType::Regular
        });
        header.set_cksum();
        builder
            .append(&header, entry.data.as_slice())
            .expect("Failed to append entry");
    }
    builder.into_inner().expect("Failed to finish archive")
}

/// Build a single USTAR header block with explicit prefix and name fields.
#[must_use]
pub fn ustar_header(prefix: &str, name: &str, size: u64) -> Vec<u8> {
    let mut block = vec![0u8; 512];
    block[..name.len()].copy_from_slice(name.as_bytes());
    block[100..108].copy_from_slice(b"0000644\0");
    block[124..136].copy_from_slice(format!("{size:011o}\0").as_bytes());
    block[136..148].copy_from_slice(b"00000000000\0");
    block[156] = b'0';
    block[257..263].copy_from_slice(b"ustar\0");
    block[263..265].copy_from_slice(b"00");
    block[345..345 + prefix.len()].copy_from_slice(prefix.as_bytes());

    block[148..156].copy_from_slice(b"        ");
    let checksum: u32 = block.iter().map(|&b| u32::from(b)).sum();
    block[148..156].copy_from_slice(format!("{checksum:06o}\0 ").as_bytes());
    block
}

/// Declarative description of a bundle container
#[derive(Default, Clone)]
pub struct BundleSpec {
    metadata: Option<String>,
    assets: Vec<(String, Vec<u8>)>,
    folders: Vec<String>,
}

impl BundleSpec {
    /// Bundle whose metadata carries `title`
    #[must_use]
    pub fn titled(title: &str) -> Self {
        Self {
            metadata: Some(format!(r#"{{"title":"{title}","version":"1.0.0"}}"#)),
            ..Self::default()
        }
    }

    /// Bundle without an extra field; its title comes from the file name
    #[must_use]
    pub fn untitled() -> Self {
        Self::default()
    }

    /// Add a file asset with a metadata companion
    #[must_use]
    pub fn asset(mut self, pathname: &str, data: &[u8]) -> Self {
        self.assets.push((pathname.to_string(), data.to_vec()));
        self
    }

    /// Add a folder entry (metadata companion only)
    #[must_use]
    pub fn folder(mut self, pathname: &str) -> Self {
        self.folders.push(pathname.to_string());
        self
    }

    /// TAR entries in container layout
    #[must_use]
    pub fn tar_entries(&self) -> Vec<TarEntry> {
        let mut entries = Vec::new();
        let mut counter = 0u32;
        let mut next_hash = || {
            counter += 1;
            format!("{counter:032x}")
        };

        for folder in &self.folders {
            let hash = next_hash();
            entries.push(TarEntry::dir(&format!("{hash}/")));
            entries.push(TarEntry::file(&format!("{hash}/asset.meta"), b"folderAsset: yes\n"));
            entries.push(TarEntry::file(&format!("{hash}/pathname"), folder.as_bytes()));
        }
        for (pathname, data) in &self.assets {
            let hash = next_hash();
            entries.push(TarEntry::dir(&format!("{hash}/")));
            entries.push(TarEntry::file(&format!("{hash}/asset"), data));
            entries.push(TarEntry::file(&format!("{hash}/asset.meta"), b"fileFormatVersion: 2\n"));
            entries.push(TarEntry::file(&format!("{hash}/pathname"), pathname.as_bytes()));
        }
        entries
    }

    /// Gzip-compressed container bytes
    ///
    /// # Panics
    ///
    /// Panics if compression fails.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let tar = raw_tar(&self.tar_entries());
        let mut builder = GzBuilder::new();
        if let Some(metadata) = &self.metadata {
            let mut extra = Vec::new();
            extra.extend_from_slice(&METADATA_SUBFIELD_ID);
            let len = u16::try_from(metadata.len()).expect("metadata too long");
            extra.extend_from_slice(&len.to_le_bytes());
            extra.extend_from_slice(metadata.as_bytes());
            builder = builder.extra(extra);
        }
        let mut encoder = builder.write(Vec::new(), Compression::default());
        encoder.write_all(&tar).expect("Failed to compress");
        encoder.finish().expect("Failed to finish gzip stream")
    }
}

/// Write a bundle container into `dir` and return its path.
///
/// # Panics
///
/// Panics if the file cannot be written.
#[must_use]
pub fn write_bundle(dir: &Path, file_name: &str, spec: &BundleSpec) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, spec.to_bytes()).expect("Failed to write bundle");
    path
}

/// Extractor that writes fixed files under a root and reports a fixed event
pub struct ScriptedExtractor {
    root: PathBuf,
    files: Vec<(String, Vec<u8>)>,
    event: ExtractionEvent,
    calls: RefCell<usize>,
}

impl ScriptedExtractor {
    #[must_use]
    pub fn new(root: &Path, event: ExtractionEvent) -> Self {
        Self {
            root: root.to_path_buf(),
            files: Vec::new(),
            event,
            calls: RefCell::new(0),
        }
    }

    /// Write `data` at the project-relative `path` when extracting
    #[must_use]
    pub fn writes(mut self, path: &str, data: &[u8]) -> Self {
        self.files.push((path.to_string(), data.to_vec()));
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.borrow()
    }
}

impl Extractor for ScriptedExtractor {
    fn name(&self) -> &str {
        "scripted"
    }

    fn extract(&self, _container: &Path, _interactive: bool) -> ExtractionEvent {
        *self.calls.borrow_mut() += 1;
        for (path, data) in &self.files {
            let full_path = self.root.join(path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create parent directory");
            }
            std::fs::write(&full_path, data).expect("Failed to write extracted file");
        }
        self.event.clone()
    }
}

/// In-memory version control that records every call
#[derive(Default)]
pub struct FakeVcs {
    tracked: RefCell<BTreeSet<PathBuf>>,
    calls: RefCell<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl FakeVcs {
    /// Every operation named `operation` fails
    #[must_use]
    pub fn failing(operation: &'static str) -> Self {
        Self {
            fail_on: Some(operation),
            ..Self::default()
        }
    }

    /// Mark `path` as tracked
    pub fn track(&self, path: &Path) {
        self.tracked.borrow_mut().insert(path.to_path_buf());
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.tracked.borrow().contains(path)
    }

    /// Calls in order, formatted as `operation:file_name`
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, operation: &'static str, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.calls.borrow_mut().push(format!("{operation}:{name}"));
        }
        if self.fail_on == Some(operation) {
            return Err(operation_failed(operation, "injected failure"));
        }
        Ok(())
    }
}

impl VersionControl for FakeVcs {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn status(&self, path: &Path) -> Result<FileStatus> {
        if self.fail_on == Some("status") {
            return Err(operation_failed("status", "injected failure"));
        }
        Ok(if self.is_tracked(path) {
            FileStatus::Tracked
        } else {
            FileStatus::Untracked
        })
    }

    fn checkout(&self, paths: &[PathBuf]) -> Result<()> {
        self.record("checkout", paths)
    }

    fn add(&self, paths: &[PathBuf]) -> Result<()> {
        self.record("add", paths)?;
        for path in paths {
            self.track(path);
        }
        Ok(())
    }

    fn delete(&self, paths: &[PathBuf]) -> Result<()> {
        self.record("delete", paths)?;
        let mut tracked = self.tracked.borrow_mut();
        for path in paths {
            tracked.retain(|t| !t.starts_with(path));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project() {
        let (temp, project) = create_project();
        assert!(temp.path().join("Assets").is_dir());
        assert!(project.state_dir.is_dir());
    }

    #[test]
    fn test_create_git_repo() {
        let (temp, path) = create_git_repo();
        assert!(path.join(".git").exists());
        assert!(temp.path().exists());
    }

    #[test]
    fn test_ustar_header_is_one_block() {
        let header = ustar_header("prefix", "name", 10);
        assert_eq!(header.len(), 512);
        assert_eq!(&header[124..135], b"00000000012");
    }

    #[test]
    fn test_bundle_spec_starts_with_gzip_magic() {
        let bytes = BundleSpec::titled("X").asset("Assets/a.cs", b"a").to_bytes();
        assert_eq!(&bytes[..2], &[31, 139]);
        assert_ne!(bytes[3] & 0x04, 0);
    }
}
