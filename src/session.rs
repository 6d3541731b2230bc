//! Durable install session
//!
//! The session is written before extraction is triggered and removed once
//! the install is persisted, failed, or cancelled. While it exists it is
//! the only record of an unfinished install, so a process that is torn down
//! mid-extraction can pick the install up again on its next start.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::manifest::BundleManifest;
use crate::project::Project;
use crate::project::storage::{read_json, remove_if_exists, write_json};
use crate::snapshot::ProjectSnapshot;

/// An install between trigger and persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallSession {
    pub candidate_manifest: BundleManifest,

    /// Sorted snapshot taken before extraction
    pub pre_install_snapshot: ProjectSnapshot,

    /// Container the install was started from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl InstallSession {
    pub fn new(candidate_manifest: BundleManifest, mut pre_install_snapshot: ProjectSnapshot) -> Self {
        pre_install_snapshot.sort();
        Self {
            candidate_manifest,
            pre_install_snapshot,
            container: None,
        }
    }

    #[must_use]
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.candidate_manifest.title
    }
}

/// Location of the single session file of a project
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_project(project: &Project) -> Self {
        Self::new(project.session_path())
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the pending session, if any
    pub fn load(&self) -> Result<Option<InstallSession>> {
        read_json(&self.path)
    }

    /// Durably write the session
    pub fn save(&self, session: &InstallSession) -> Result<()> {
        write_json(&self.path, session)?;
        tracing::debug!(title = %session.title(), "persisted install session");
        Ok(())
    }

    /// Delete the session; returns whether one existed
    pub fn purge(&self) -> Result<bool> {
        let removed = remove_if_exists(&self.path)?;
        if removed {
            tracing::debug!(path = %self.path.display(), "purged install session");
        }
        Ok(removed)
    }

    /// Purge the session, returning its title when it could still be read
    pub fn discard(&self) -> Result<Option<String>> {
        let title = match self.load() {
            Ok(session) => session.map(|s| s.title().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable install session");
                None
            }
        };
        self.purge()?;
        Ok(title)
    }
}
