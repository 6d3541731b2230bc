//! Git backend over `git2`
//!
//! Works on the index only: files are written and removed on disk by the
//! caller. Checkout is a no-op because git never locks working files.

use std::path::{Path, PathBuf};

use git2::{Repository, Status};

use crate::error::Result;

use super::{FileStatus, VersionControl, operation_failed};

/// Repository-backed version control
pub struct GitVcs {
    repo: Repository,
    workdir: PathBuf,
}

impl std::fmt::Debug for GitVcs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitVcs")
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}

impl GitVcs {
    /// Open the repository containing `path`
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| operation_failed("open", e.message()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| operation_failed("open", "repository is bare"))?;
        let workdir = dunce::canonicalize(workdir).map_err(|e| operation_failed("open", e.to_string()))?;

        Ok(Self { repo, workdir })
    }

    /// Path relative to the working directory, as git expects it
    fn relative<'a>(&self, path: &'a Path) -> Result<&'a Path> {
        path.strip_prefix(&self.workdir).map_err(|_| {
            operation_failed(
                "path",
                format!("{} is outside the repository", path.display()),
            )
        })
    }

    /// A directory is tracked when the index holds anything under it
    fn directory_status(&self, relative: &Path) -> Result<FileStatus> {
        let index = self
            .repo
            .index()
            .map_err(|e| operation_failed("status", e.message()))?;
        let prefix = format!("{}/", crate::path_utils::to_forward_slashes(relative));
        let tracked = index
            .iter()
            .any(|entry| entry.path.starts_with(prefix.as_bytes()));
        Ok(if tracked {
            FileStatus::Tracked
        } else {
            FileStatus::Untracked
        })
    }

    fn with_index<F>(&self, operation: &str, mut apply: F) -> Result<()>
    where
        F: FnMut(&mut git2::Index) -> std::result::Result<(), git2::Error>,
    {
        let mut index = self
            .repo
            .index()
            .map_err(|e| operation_failed(operation, e.message()))?;
        apply(&mut index).map_err(|e| operation_failed(operation, e.message()))?;
        index
            .write()
            .map_err(|e| operation_failed(operation, e.message()))
    }
}

impl VersionControl for GitVcs {
    fn name(&self) -> &'static str {
        "git"
    }

    fn status(&self, path: &Path) -> Result<FileStatus> {
        let relative = self.relative(path)?;
        if path.is_dir() {
            return self.directory_status(relative);
        }
        match self.repo.status_file(relative) {
            Ok(status) if status.contains(Status::IGNORED) => Ok(FileStatus::Ignored),
            Ok(status) if status.contains(Status::WT_NEW) => Ok(FileStatus::Untracked),
            Ok(_) => Ok(FileStatus::Tracked),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(FileStatus::Untracked),
            Err(e) => Err(operation_failed("status", e.message())),
        }
    }

    fn checkout(&self, _paths: &[PathBuf]) -> Result<()> {
        Ok(())
    }

    fn add(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let relative: Vec<&Path> = paths.iter().map(|p| self.relative(p)).collect::<Result<_>>()?;
        self.with_index("add", |index| {
            for path in &relative {
                index.add_path(path)?;
            }
            Ok(())
        })?;
        tracing::debug!(files = paths.len(), "added files to git index");
        Ok(())
    }

    fn delete(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let entries: Vec<(&Path, bool)> = paths
            .iter()
            .map(|p| Ok((self.relative(p)?, p.is_dir())))
            .collect::<Result<_>>()?;
        self.with_index("delete", |index| {
            for (path, is_dir) in &entries {
                if *is_dir {
                    index.remove_dir(path, 0)?;
                } else {
                    index.remove_path(path)?;
                }
            }
            Ok(())
        })?;
        tracing::debug!(paths = paths.len(), "removed paths from git index");
        Ok(())
    }
}
