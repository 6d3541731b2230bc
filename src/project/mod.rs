//! Project management for bundlekeeper
//!
//! This module handles:
//! - Project detection and initialization
//! - Configuration loading
//! - Locations of the manifest store and the install session
//!
//! ## Project Structure
//!
//! ```text
//! <root>/
//! ├── Assets/                      # Snapshotted subtree (configurable)
//! └── .bundlekeeper/
//!     ├── .gitignore               # Excludes the session file
//!     ├── config.yaml              # Optional project settings
//!     ├── install-session.json     # Present only while an install is pending
//!     └── manifests/               # One record per installed bundle
//! ```

pub mod config;
pub mod storage;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BundleError, Result, file_write_failed};

pub use config::{ExtractorConfig, ProjectConfig, VcsKind, load_config};

/// State directory name
pub const STATE_DIR: &str = ".bundlekeeper";

/// Manifest store subdirectory
pub const MANIFESTS_DIR: &str = "manifests";

/// Durable install session filename
pub const SESSION_FILE: &str = "install-session.json";

/// A project tree that bundles install into
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (where .bundlekeeper is located)
    pub root: PathBuf,

    /// Path to the .bundlekeeper directory
    pub state_dir: PathBuf,

    /// Loaded configuration
    pub config: ProjectConfig,
}

impl Project {
    /// Detect if a project exists at the given path
    pub fn exists(root: &Path) -> bool {
        root.join(STATE_DIR).is_dir()
    }

    /// Find a project by searching upward from the given path
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if Self::exists(&current) {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Open an existing project
    pub fn open(root: &Path) -> Result<Self> {
        let root = canonical_root(root)?;
        let state_dir = root.join(STATE_DIR);

        if !state_dir.is_dir() {
            return Err(BundleError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }

        let config = load_config(&state_dir)?;

        Ok(Self {
            root,
            state_dir,
            config,
        })
    }

    /// Initialize the state directory under `root`
    pub fn init(root: &Path) -> Result<Self> {
        let root = canonical_root(root)?;
        let state_dir = root.join(STATE_DIR);

        fs::create_dir_all(state_dir.join(MANIFESTS_DIR))
            .map_err(|e| file_write_failed(state_dir.display().to_string(), e.to_string()))?;

        // The session is per-machine state and never belongs in version control
        let gitignore_path = state_dir.join(".gitignore");
        fs::write(&gitignore_path, format!("{SESSION_FILE}\n"))
            .map_err(|e| file_write_failed(gitignore_path.display().to_string(), e.to_string()))?;

        tracing::debug!(root = %root.display(), "initialized project");

        Ok(Self {
            root,
            state_dir,
            config: ProjectConfig::default(),
        })
    }

    /// Initialize a project if it doesn't exist, or open it if it does
    pub fn init_or_open(root: &Path) -> Result<Self> {
        if Self::exists(root) {
            Self::open(root)
        } else {
            Self::init(root)
        }
    }

    /// Directory holding manifest records
    pub fn manifests_dir(&self) -> PathBuf {
        self.state_dir.join(MANIFESTS_DIR)
    }

    /// Path of the durable install session
    pub fn session_path(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }

    /// Absolute path of a normalized project-relative path
    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    dunce::canonicalize(root).map_err(|_| BundleError::ProjectNotFound {
        path: root.display().to_string(),
    })
}
