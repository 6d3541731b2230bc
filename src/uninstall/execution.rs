//! Uninstall execution

use std::path::PathBuf;

use crate::error::Result;
use crate::transaction::Transaction;
use crate::vcs::{VersionControl, tracked_paths};

use super::UninstallPlan;

/// What an executed uninstall removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallReport {
    pub title: String,
    pub files_removed: usize,
    pub directories_removed: usize,
    pub vcs_deleted: Vec<PathBuf>,
}

/// Apply `plan`: version control first, then the project tree and the
/// manifest record inside one transaction
pub fn execute_uninstall(plan: &UninstallPlan, vcs: &dyn VersionControl) -> Result<UninstallReport> {
    for (path, titles) in &plan.shared {
        tracing::warn!(path, claimed_by = ?titles, "removing a path another bundle also installed");
    }

    let mut candidates: Vec<PathBuf> = plan.files.clone();
    candidates.extend(plan.directories.iter().cloned());
    candidates.push(plan.record_path.clone());
    let tracked = tracked_paths(vcs, &candidates)?;
    if !tracked.is_empty() {
        vcs.delete(&tracked)?;
    }

    let mut transaction = Transaction::new();
    for file in &plan.files {
        transaction.remove_file(file)?;
    }
    for dir in &plan.directories {
        transaction.remove_dir_all(dir)?;
    }
    transaction.remove_file(&plan.record_path)?;
    transaction.commit();

    tracing::info!(
        title = %plan.title,
        files = plan.files.len(),
        directories = plan.directories.len(),
        "uninstalled bundle"
    );

    Ok(UninstallReport {
        title: plan.title.clone(),
        files_removed: plan.files.len(),
        directories_removed: plan.directories.len(),
        vcs_deleted: tracked,
    })
}
