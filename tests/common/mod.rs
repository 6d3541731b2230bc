//! Common test utilities for bundlekeeper integration tests

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use flate2::{Compression, GzBuilder};
use tempfile::TempDir;

/// A test project for integration tests
pub struct TestProject {
    /// Temporary directory
    pub temp: TempDir,
    /// Path to project root
    pub path: PathBuf,
}

impl TestProject {
    /// Create a new, uninitialized test project
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = dunce::canonicalize(temp.path()).expect("Failed to canonicalize temp directory");
        Self { temp, path }
    }

    /// Create the .bundlekeeper state directory
    pub fn init(&self) -> PathBuf {
        let state_dir = self.path.join(".bundlekeeper");
        std::fs::create_dir_all(state_dir.join("manifests"))
            .expect("Failed to create .bundlekeeper directory");
        state_dir
    }

    /// Write .bundlekeeper/config.yaml
    pub fn write_config(&self, yaml: &str) {
        let state_dir = self.init();
        std::fs::write(state_dir.join("config.yaml"), yaml).expect("Failed to write config");
    }

    /// Write a file in the project
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the project
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a path exists in the project
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Write a bundle container next to (not inside) the project tree
    pub fn write_bundle(&self, file_name: &str, bundle: &BundleFixture) -> PathBuf {
        let dir = self.path.join("downloads");
        std::fs::create_dir_all(&dir).expect("Failed to create downloads directory");
        let path = dir.join(file_name);
        std::fs::write(&path, bundle.to_bytes()).expect("Failed to write bundle");
        path
    }

    /// Path of the manifest record for `title`
    pub fn record_path(&self, title: &str) -> PathBuf {
        self.path
            .join(".bundlekeeper")
            .join("manifests")
            .join(bundlekeeper::manifest::store::record_file_name(title))
    }

    /// Path of the durable install session
    pub fn session_path(&self) -> PathBuf {
        self.path.join(".bundlekeeper").join("install-session.json")
    }

    /// Command running the binary inside this project
    pub fn cmd(&self) -> Command {
        bundlekeeper_cmd_for_project(&self.path)
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Bundlekeeper command isolated from the developer's environment
pub fn bundlekeeper_cmd() -> Command {
    let mut cmd = Command::cargo_bin("bundlekeeper").expect("Failed to find bundlekeeper binary");
    cmd.env_remove("BUNDLEKEEPER_PROJECT");
    cmd.env_remove("BUNDLEKEEPER_LOG");
    cmd
}

/// Bundlekeeper command running from `path`
pub fn bundlekeeper_cmd_for_project(path: &Path) -> Command {
    let mut cmd = bundlekeeper_cmd();
    cmd.current_dir(path);
    cmd
}

/// Builder for gzip/TAR bundle containers
#[derive(Default, Clone)]
pub struct BundleFixture {
    title: Option<String>,
    assets: Vec<(String, Vec<u8>)>,
    folders: Vec<String>,
}

impl BundleFixture {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn untitled() -> Self {
        Self::default()
    }

    pub fn asset(mut self, pathname: &str, data: &str) -> Self {
        self.assets.push((pathname.to_string(), data.as_bytes().to_vec()));
        self
    }

    pub fn folder(mut self, pathname: &str) -> Self {
        self.folders.push(pathname.to_string());
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut tar = tar::Builder::new(Vec::new());
        let mut counter = 0u32;

        for folder in &self.folders {
            counter += 1;
            let hash = format!("{counter:032x}");
            append(&mut tar, &format!("{hash}/asset.meta"), b"folderAsset: yes\n");
            append(&mut tar, &format!("{hash}/pathname"), folder.as_bytes());
        }
        for (pathname, data) in &self.assets {
            counter += 1;
            let hash = format!("{counter:032x}");
            append(&mut tar, &format!("{hash}/asset"), data);
            append(&mut tar, &format!("{hash}/asset.meta"), b"fileFormatVersion: 2\n");
            append(&mut tar, &format!("{hash}/pathname"), pathname.as_bytes());
        }
        let payload = tar.into_inner().expect("Failed to finish tar");

        let mut builder = GzBuilder::new();
        if let Some(title) = &self.title {
            let metadata = format!(r#"{{"title":"{title}","version":"1.0.0"}}"#);
            let mut extra = b"AB".to_vec();
            let len = u16::try_from(metadata.len()).expect("metadata too long");
            extra.extend_from_slice(&len.to_le_bytes());
            extra.extend_from_slice(metadata.as_bytes());
            builder = builder.extra(extra);
        }
        let mut encoder = builder.write(Vec::new(), Compression::default());
        encoder.write_all(&payload).expect("Failed to compress");
        encoder.finish().expect("Failed to finish gzip stream")
    }
}

fn append(tar: &mut tar::Builder<Vec<u8>>, path: &str, data: &[u8]) {
    let mut header = tar::Header::new_ustar();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    tar.append_data(&mut header, path, data)
        .expect("Failed to append tar entry");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let project = TestProject::new();
        assert!(project.path.exists());
        assert!(!project.file_exists(".bundlekeeper"));
    }

    #[test]
    fn test_project_file_operations() {
        let project = TestProject::new();
        project.write_file("Assets/file.txt", "hello");
        assert!(project.file_exists("Assets/file.txt"));
        assert_eq!(project.read_file("Assets/file.txt"), "hello");
    }

    #[test]
    fn test_bundle_fixture_is_gzip() {
        let bytes = BundleFixture::titled("X").asset("Assets/x.cs", "x").to_bytes();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }
}
