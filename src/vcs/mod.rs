//! Version control collaborators
//!
//! Installs and uninstalls keep the project's version control in step with
//! the files they touch: records are checked out before they are
//! overwritten, new files are added, removed files are deleted. Every
//! failure surfaces as [`BundleError::VcsOperationFailed`].

pub mod git;

use std::path::{Path, PathBuf};

use crate::error::{BundleError, Result};
use crate::project::{Project, VcsKind};

pub use git::GitVcs;

/// Version control state of one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Not known to version control
    Untracked,
    /// Known to version control (modified or not)
    Tracked,
    /// Excluded by ignore rules
    Ignored,
}

impl FileStatus {
    pub fn is_tracked(self) -> bool {
        self == FileStatus::Tracked
    }
}

/// Operations the core needs from a version control system.
///
/// Paths are absolute.
pub trait VersionControl {
    /// Backend name for messages
    fn name(&self) -> &'static str;

    fn status(&self, path: &Path) -> Result<FileStatus>;

    /// Make files writable before they are overwritten
    fn checkout(&self, paths: &[PathBuf]) -> Result<()>;

    /// Start tracking new files
    fn add(&self, paths: &[PathBuf]) -> Result<()>;

    /// Stop tracking files or directories
    fn delete(&self, paths: &[PathBuf]) -> Result<()>;
}

/// No version control: every path is untracked and every operation succeeds
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVcs;

impl VersionControl for NoVcs {
    fn name(&self) -> &'static str {
        "none"
    }

    fn status(&self, _path: &Path) -> Result<FileStatus> {
        Ok(FileStatus::Untracked)
    }

    fn checkout(&self, _paths: &[PathBuf]) -> Result<()> {
        Ok(())
    }

    fn add(&self, _paths: &[PathBuf]) -> Result<()> {
        Ok(())
    }

    fn delete(&self, _paths: &[PathBuf]) -> Result<()> {
        Ok(())
    }
}

/// Backend selected by the project configuration
pub fn for_project(project: &Project) -> Result<Box<dyn VersionControl>> {
    match project.config.vcs {
        VcsKind::None => Ok(Box::new(NoVcs)),
        VcsKind::Git => Ok(Box::new(GitVcs::discover(&project.root)?)),
    }
}

/// Keep only the paths `vcs` tracks
pub fn tracked_paths(vcs: &dyn VersionControl, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut tracked = Vec::new();
    for path in paths {
        if vcs.status(path)?.is_tracked() {
            tracked.push(path.clone());
        }
    }
    Ok(tracked)
}

/// Keep only the paths `vcs` does not know about
pub fn untracked_paths(vcs: &dyn VersionControl, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut untracked = Vec::new();
    for path in paths {
        if vcs.status(path)? == FileStatus::Untracked {
            untracked.push(path.clone());
        }
    }
    Ok(untracked)
}

pub(crate) fn operation_failed(operation: &str, message: impl Into<String>) -> BundleError {
    BundleError::VcsOperationFailed {
        operation: operation.to_string(),
        message: message.into(),
    }
}
