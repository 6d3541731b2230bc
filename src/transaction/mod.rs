//! Transaction support for atomic filesystem changes
//!
//! This module provides a transaction pattern for installs and uninstalls,
//! ensuring that the project tree and manifest store are never left half
//! changed when a step fails.
//!
//! ## Usage
//!
//! ```ignore
//! let mut transaction = Transaction::new();
//! transaction.remove_file(&path)?;
//! transaction.write_file(&record, &content)?;
//!
//! // On success:
//! transaction.commit();
//!
//! // On error (automatic via Drop if not committed):
//! // rollback happens automatically
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, file_read_failed, file_write_failed};
use crate::project::storage::write_atomic;

/// Original content of a file the transaction replaced or removed
#[derive(Debug, Clone)]
struct FileBackup {
    /// Original path
    path: PathBuf,
    /// Backed up content
    content: Vec<u8>,
}

/// A transaction over project files
#[derive(Debug, Default)]
pub struct Transaction {
    /// Files removed or overwritten (with original content)
    backups: Vec<FileBackup>,

    /// Paths already backed up
    backed_up: HashSet<PathBuf>,

    /// Files created during this transaction
    created_files: HashSet<PathBuf>,

    /// Directories removed during this transaction
    removed_dirs: Vec<PathBuf>,

    /// Whether the transaction has been committed
    committed: bool,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the current state of `path` so rollback can restore it
    pub fn backup_file(&mut self, path: &Path) -> Result<()> {
        if self.backed_up.contains(path) || self.created_files.contains(path) {
            return Ok(());
        }

        if path.is_file() {
            let content =
                fs::read(path).map_err(|e| file_read_failed(path.display().to_string(), e.to_string()))?;
            self.backups.push(FileBackup {
                path: path.to_path_buf(),
                content,
            });
            self.backed_up.insert(path.to_path_buf());
        } else {
            self.created_files.insert(path.to_path_buf());
        }
        Ok(())
    }

    /// Atomically write `content` to `path`, backing up what was there
    pub fn write_file(&mut self, path: &Path, content: &[u8]) -> Result<()> {
        self.backup_file(path)?;
        write_atomic(path, content)
    }

    /// Remove a file, backing it up first; a missing file is not an error
    pub fn remove_file(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Ok(());
        }
        self.backup_file(path)?;
        fs::remove_file(path).map_err(|e| file_write_failed(path.display().to_string(), e.to_string()))
    }

    /// Remove a directory tree, backing up every file in it
    pub fn remove_dir_all(&mut self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Ok(());
        }

        for entry in WalkDir::new(path) {
            let entry = entry.map_err(|e| file_read_failed(path.display().to_string(), e.to_string()))?;
            if entry.file_type().is_dir() {
                self.removed_dirs.push(entry.path().to_path_buf());
            } else {
                self.backup_file(entry.path())?;
            }
        }

        fs::remove_dir_all(path).map_err(|e| file_write_failed(path.display().to_string(), e.to_string()))
    }

    /// Commit the transaction (prevent rollback)
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Manually trigger a rollback
    pub fn rollback(&mut self) {
        if self.committed {
            return;
        }

        // Remove created files
        for path in &self.created_files {
            if path.is_file() {
                let _ = fs::remove_file(path);
            }
        }

        // Recreate removed directories, parents first
        let mut dirs: Vec<_> = self.removed_dirs.iter().collect();
        dirs.sort_by_key(|d| d.components().count());
        for dir in dirs {
            if let Err(e) = fs::create_dir_all(dir) {
                tracing::warn!(path = %dir.display(), error = %e, "failed to recreate directory");
            }
        }

        // Restore removed or modified files
        for backup in &self.backups {
            if let Some(parent) = backup.path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Err(e) = fs::write(&backup.path, &backup.content) {
                tracing::warn!(path = %backup.path.display(), error = %e, "failed to restore file");
            }
        }

        tracing::debug!(
            restored = self.backups.len(),
            removed = self.created_files.len(),
            "rolled back transaction"
        );
        self.committed = true;
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.committed {
            // Automatic rollback on drop if not committed
            self.rollback();
        }
    }
}
