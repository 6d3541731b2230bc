//! Project configuration (`.bundlekeeper/config.yaml`)
//!
//! The file is optional; a missing file yields [`ProjectConfig::default`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wax::Glob;

use crate::error::{BundleError, Result};

/// Configuration filename inside the state directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Version control backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    #[default]
    None,
    Git,
}

/// External importer settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Program to run with the container path; `None` selects the built-in unpacker
    pub command: Option<String>,

    /// Arguments placed before the container path
    pub args: Vec<String>,

    /// Default for `install --interactive`
    pub interactive: bool,

    /// Launch the program without waiting; the install finishes on `resume`
    pub detach: bool,
}

/// Project-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Globs selecting the snapshotted subtree
    pub include: Vec<String>,

    /// Globs excluded from snapshots
    pub ignore: Vec<String>,

    /// Whether snapshots hash file contents
    pub hash_contents: bool,

    /// Suffix of metadata companion files
    pub meta_extension: String,

    pub vcs: VcsKind,

    pub extractor: ExtractorConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            include: vec!["assets/**".to_string()],
            ignore: vec![
                "**/.ds_store".to_string(),
                "**/thumbs.db".to_string(),
                "**/desktop.ini".to_string(),
                "**/._*".to_string(),
            ],
            hash_contents: false,
            meta_extension: ".meta".to_string(),
            vcs: VcsKind::None,
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Parse configuration from YAML; `source` names the file in errors
    pub fn from_yaml(content: &str, source: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut config: Self =
            serde_yaml::from_str(content).map_err(|e| BundleError::ConfigParseFailed {
                path: source.to_string(),
                reason: e.to_string(),
            })?;
        config.lowercase_patterns();
        config.validate()?;
        Ok(config)
    }

    /// Lowercase globs and the meta extension; they are matched against
    /// normalized (lowercase) paths
    fn lowercase_patterns(&mut self) {
        for pattern in self.include.iter_mut().chain(self.ignore.iter_mut()) {
            *pattern = pattern.to_lowercase();
        }
        self.meta_extension = self.meta_extension.to_lowercase();
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check fields that serde cannot
    pub fn validate(&self) -> Result<()> {
        if !self.meta_extension.starts_with('.') || self.meta_extension.len() < 2 {
            return Err(BundleError::ConfigInvalid {
                message: format!(
                    "meta_extension must start with '.', got {:?}",
                    self.meta_extension
                ),
            });
        }

        for pattern in self.include.iter().chain(&self.ignore) {
            Glob::new(pattern).map_err(|e| BundleError::ConfigInvalid {
                message: format!("invalid glob '{pattern}': {e}"),
            })?;
        }

        if self.extractor.command.as_deref().is_some_and(str::is_empty) {
            return Err(BundleError::ConfigInvalid {
                message: "extractor.command must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Load the configuration from a state directory
pub fn load_config(state_dir: &Path) -> Result<ProjectConfig> {
    let path = state_dir.join(CONFIG_FILE);

    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = fs::read_to_string(&path).map_err(|e| BundleError::ConfigReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    ProjectConfig::from_yaml(&content, &path.display().to_string())
}
