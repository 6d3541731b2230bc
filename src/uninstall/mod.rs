//! Uninstall planning and execution
//!
//! Planning decides which files and directories an uninstall removes:
//! every asset the bundle installed (with its metadata companion), and
//! every directory the bundle declared that would be left holding nothing
//! of value. Execution applies the plan inside a [`Transaction`].

pub mod execution;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, file_read_failed};
use crate::manifest::{BundleManifest, ManifestStore};
use crate::path_utils::{is_meta_path, meta_path_for, normalize_relative, strip_meta_extension};
use crate::project::Project;
use crate::snapshot::{PathFilter, PathIndex, ProjectSnapshotter};

pub use execution::{UninstallReport, execute_uninstall};

/// What an uninstall will remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallPlan {
    pub title: String,

    /// Files to delete, sorted
    pub files: Vec<PathBuf>,

    /// Directories to delete, deepest first
    pub directories: Vec<PathBuf>,

    /// Scheduled paths that other installed bundles also claim
    pub shared: BTreeMap<String, Vec<String>>,

    /// Manifest record removed last
    pub record_path: PathBuf,
}

impl UninstallPlan {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }
}

/// Builds uninstall plans for one project
pub struct UninstallPlanner {
    root: PathBuf,
    snapshotter: ProjectSnapshotter,
    filter: PathFilter,
    manifests: ManifestStore,
    meta_extension: String,
}

impl UninstallPlanner {
    pub fn new(project: &Project) -> Result<Self> {
        Ok(Self {
            root: project.root.clone(),
            snapshotter: ProjectSnapshotter::for_project(project)?,
            filter: PathFilter::from_config(&project.config)?,
            manifests: ManifestStore::for_project(project),
            meta_extension: project.config.meta_extension.clone(),
        })
    }

    /// Plan the removal of the bundle `title`
    pub fn plan_title(&self, title: &str) -> Result<UninstallPlan> {
        let manifest = self.manifests.get(title)?;
        let others: Vec<BundleManifest> = self
            .manifests
            .list()?
            .into_iter()
            .filter(|m| m.title != manifest.title)
            .collect();
        self.plan(&manifest, &others)
    }

    /// Plan the removal of `manifest`; `others` are the remaining installs
    pub fn plan(&self, manifest: &BundleManifest, others: &[BundleManifest]) -> Result<UninstallPlan> {
        let index = self.snapshotter.path_index()?;
        let ext = self.meta_extension.as_str();

        let mut files: BTreeSet<PathBuf> = BTreeSet::new();
        let mut candidates: BTreeSet<String> = BTreeSet::new();
        let mut scheduled: BTreeSet<String> = BTreeSet::new();

        for path in manifest.tracked_paths() {
            if let Some(stripped) = strip_meta_extension(&path, ext) {
                // File companions travel with their asset
                if index.dirs.contains_key(stripped) {
                    candidates.insert(stripped.to_string());
                }
            } else if index.dirs.contains_key(&path) {
                candidates.insert(path);
            } else {
                schedule(&index, &path, &mut files, &mut scheduled);
                schedule(&index, &meta_path_for(&path, ext), &mut files, &mut scheduled);
            }
        }

        let directories = self.prune(&index, candidates, &scheduled)?;
        for dir in &directories {
            if let Some(normalized) = normalize_relative(&self.root, dir) {
                schedule(&index, &meta_path_for(&normalized, ext), &mut files, &mut scheduled);
            }
        }

        let shared = shared_paths(&scheduled, others);

        tracing::debug!(
            title = %manifest.title,
            files = files.len(),
            directories = directories.len(),
            "planned uninstall"
        );

        Ok(UninstallPlan {
            title: manifest.title.clone(),
            files: files.into_iter().collect(),
            directories,
            shared,
            record_path: self.manifests.record_path(&manifest.title),
        })
    }

    /// Candidate directories that hold nothing but metadata, OS artifacts,
    /// scheduled files, and other pruned directories. Deepest first.
    fn prune(
        &self,
        index: &PathIndex,
        candidates: BTreeSet<String>,
        scheduled: &BTreeSet<String>,
    ) -> Result<Vec<PathBuf>> {
        let mut ordered: Vec<String> = candidates.into_iter().collect();
        ordered.sort_by(|a, b| depth(b).cmp(&depth(a)).then_with(|| a.cmp(b)));

        let mut approved: BTreeSet<String> = BTreeSet::new();
        let mut directories = Vec::new();

        for candidate in ordered {
            let Some(dir) = index.dirs.get(&candidate) else {
                continue;
            };
            if self.is_prunable(dir, scheduled, &approved)? {
                approved.insert(candidate);
                directories.push(dir.clone());
            } else {
                tracing::debug!(dir = %dir.display(), "keeping non-empty directory");
            }
        }

        Ok(directories)
    }

    fn is_prunable(
        &self,
        dir: &Path,
        scheduled: &BTreeSet<String>,
        approved: &BTreeSet<String>,
    ) -> Result<bool> {
        let entries =
            fs::read_dir(dir).map_err(|e| file_read_failed(dir.display().to_string(), e.to_string()))?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let Some(normalized) = normalize_relative(&self.root, &path) else {
                return Ok(false);
            };

            let removable = if entry.file_type()?.is_dir() {
                approved.contains(&normalized)
            } else {
                scheduled.contains(&normalized)
                    || is_meta_path(&normalized, &self.meta_extension)
                    || self.filter.is_ignored(&normalized)
            };
            if !removable {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn schedule(
    index: &PathIndex,
    path: &str,
    files: &mut BTreeSet<PathBuf>,
    scheduled: &mut BTreeSet<String>,
) {
    scheduled.insert(path.to_string());
    if let Some(actual) = index.files.get(path) {
        files.insert(actual.clone());
    }
}

fn depth(path: &str) -> usize {
    path.split('/').count()
}

/// Scheduled paths that other manifests also list, with the claiming titles
fn shared_paths(scheduled: &BTreeSet<String>, others: &[BundleManifest]) -> BTreeMap<String, Vec<String>> {
    let mut shared: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for other in others {
        for path in &other.canonical_file_list {
            if scheduled.contains(path) {
                shared.entry(path.clone()).or_default().push(other.title.clone());
            }
        }
    }
    shared
}
