//! Project-state snapshots
//!
//! A [`ProjectSnapshot`] is the set of [`FileStateEntry`] values under the
//! configured include globs at one instant. Two snapshots taken around an
//! opaque install step are diffed ([`diff`]) to learn which files the step
//! produced.

pub mod diff;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{BundleError, Result, file_read_failed};
use crate::hash::hash_file;
use crate::manifest::FileStateEntry;
use crate::path_utils::normalize_relative;
use crate::project::{Project, ProjectConfig, STATE_DIR};

pub use diff::diff;

/// Glob metacharacters that end a literal prefix
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '<', '>', '!', '(', ')', '#'];

/// File states of a subtree at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectSnapshot {
    entries: Vec<FileStateEntry>,
}

impl ProjectSnapshot {
    pub fn new(entries: Vec<FileStateEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FileStateEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<FileStateEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort entries ascending by path
    pub fn sort(&mut self) {
        self.entries.sort();
    }

    /// Distinct paths in the snapshot
    pub fn paths(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }
}

/// Include/ignore glob filter over normalized paths
#[derive(Debug)]
pub struct PathFilter {
    include: Vec<Glob<'static>>,
    ignore: Vec<Glob<'static>>,
    prefixes: Vec<String>,
}

impl PathFilter {
    /// Compile include and ignore patterns
    pub fn new(include: &[String], ignore: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            ignore: compile(ignore)?,
            prefixes: include.iter().map(|p| literal_prefix(p)).collect(),
        })
    }

    pub fn from_config(config: &ProjectConfig) -> Result<Self> {
        Self::new(&config.include, &config.ignore)
    }

    /// Whether a normalized file path belongs in snapshots
    pub fn is_included(&self, path: &str) -> bool {
        let candidate = CandidatePath::from(path);
        self.include.iter().any(|g| g.matched(&candidate).is_some())
            && !self.ignore.iter().any(|g| g.matched(&candidate).is_some())
    }

    /// Whether a normalized path names an OS artifact or other ignored file
    pub fn is_ignored(&self, path: &str) -> bool {
        let candidate = CandidatePath::from(path);
        self.ignore.iter().any(|g| g.matched(&candidate).is_some())
    }

    /// Whether a normalized directory could contain included files
    fn may_contain(&self, dir: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            prefix.is_empty() || is_within(dir, prefix) || is_within(prefix, dir)
        })
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Glob<'static>>> {
    patterns
        .iter()
        .map(|p| {
            Glob::new(p)
                .map(Glob::into_owned)
                .map_err(|e| BundleError::ConfigInvalid {
                    message: format!("invalid glob '{p}': {e}"),
                })
        })
        .collect()
}

/// Leading path components of a glob that contain no metacharacters
fn literal_prefix(pattern: &str) -> String {
    pattern
        .split('/')
        .take_while(|c| !c.contains(GLOB_META))
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether `path` equals `base` or lies under it
fn is_within(path: &str, base: &str) -> bool {
    path == base
        || path
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// On-disk paths of a project keyed by normalized path
#[derive(Debug, Default)]
pub struct PathIndex {
    pub files: BTreeMap<String, PathBuf>,
    pub dirs: BTreeMap<String, PathBuf>,
}

/// Enumerates a project subtree into snapshots
#[derive(Debug)]
pub struct ProjectSnapshotter {
    root: PathBuf,
    filter: PathFilter,
    hash_contents: bool,
}

impl ProjectSnapshotter {
    pub fn new(root: impl Into<PathBuf>, filter: PathFilter, hash_contents: bool) -> Self {
        Self {
            root: root.into(),
            filter,
            hash_contents,
        }
    }

    /// Snapshotter configured for `project`
    pub fn for_project(project: &Project) -> Result<Self> {
        Ok(Self::new(
            &project.root,
            PathFilter::from_config(&project.config)?,
            project.config.hash_contents,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Walk the project and record every included file, in walk order
    pub fn snapshot(&self) -> Result<ProjectSnapshot> {
        let mut entries = Vec::new();
        self.walk(|path, normalized, is_dir| {
            if !is_dir && self.filter.is_included(&normalized) {
                entries.push(self.entry_for(path, normalized)?);
            }
            Ok(())
        })?;

        tracing::debug!(root = %self.root.display(), files = entries.len(), "took snapshot");
        Ok(ProjectSnapshot::new(entries))
    }

    /// Map normalized paths back to their on-disk spelling
    pub fn path_index(&self) -> Result<PathIndex> {
        let mut index = PathIndex::default();
        self.walk(|path, normalized, is_dir| {
            if is_dir {
                index.dirs.insert(normalized, path.to_path_buf());
            } else {
                index.files.insert(normalized, path.to_path_buf());
            }
            Ok(())
        })?;
        Ok(index)
    }

    /// Visit every entry below the root that may hold included files
    fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&Path, String, bool) -> Result<()>,
    {
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                if e.file_name() == STATE_DIR || e.file_name() == ".git" {
                    return false;
                }
                normalize_relative(&self.root, e.path()).is_some_and(|d| self.filter.may_contain(&d))
            });

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map_or_else(|| self.root.display().to_string(), |p| p.display().to_string());
                file_read_failed(path, e.to_string())
            })?;

            if entry.depth() == 0 {
                continue;
            }
            let is_dir = entry.file_type().is_dir();
            if !is_dir && !entry.file_type().is_file() {
                continue;
            }
            let Some(normalized) = normalize_relative(&self.root, entry.path()) else {
                continue;
            };
            visit(entry.path(), normalized, is_dir)?;
        }
        Ok(())
    }

    fn entry_for(&self, file: &Path, path: String) -> Result<FileStateEntry> {
        let metadata = fs::metadata(file)
            .map_err(|e| file_read_failed(file.display().to_string(), e.to_string()))?;
        let content_hash = if self.hash_contents {
            Some(hash_file(file)?)
        } else {
            None
        };

        Ok(FileStateEntry {
            path,
            content_hash,
            modified_time: modified_nanos(&metadata),
            size: metadata.len(),
        })
    }
}

/// Modification time in nanoseconds since the Unix epoch, 0 when unavailable
fn modified_nanos(metadata: &fs::Metadata) -> i64 {
    let Ok(modified) = metadata.modified() else {
        return 0;
    };
    match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        Err(e) => i64::try_from(e.duration().as_nanos()).map_or(i64::MIN, |n| -n),
    }
}
