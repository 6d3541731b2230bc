//! Error types and handling for bundlekeeper
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`container`]: Container (gzip/TAR) read errors
//! - [`fs`]: File system errors

pub mod container;
pub mod fs;

pub use container::{
    invalid_format as invalid_container_format, malformed_size, truncated as truncated_archive,
};
pub use fs::{read_failed as file_read_failed, write_failed as file_write_failed};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for bundlekeeper operations
#[derive(Error, Diagnostic, Debug)]
pub enum BundleError {
    // Container errors
    #[error("Invalid container format: {path}: {reason}")]
    #[diagnostic(
        code(bundlekeeper::container::invalid_format),
        help("The file must be a gzip-compressed TAR bundle")
    )]
    InvalidContainerFormat { path: String, reason: String },

    #[error("No bundle metadata found in container header")]
    #[diagnostic(code(bundlekeeper::container::metadata_missing))]
    MetadataMissing,

    #[error("Bundle metadata has no title: {path}")]
    #[diagnostic(
        code(bundlekeeper::container::title_not_found),
        help("The embedded metadata must contain a \"title\" string")
    )]
    TitleNotFound { path: String },

    #[error("Truncated archive: {path}: {reason}")]
    #[diagnostic(code(bundlekeeper::container::truncated))]
    TruncatedArchive { path: String, reason: String },

    #[error("Malformed size field in archive entry '{entry}': {value:?}")]
    #[diagnostic(code(bundlekeeper::container::malformed_size))]
    MalformedSize { entry: String, value: String },

    // Session errors
    #[error("An install of '{title}' is already pending")]
    #[diagnostic(
        code(bundlekeeper::session::conflict),
        help(
            "Run 'bundlekeeper resume' to finish it, or 'bundlekeeper abort' to discard it before installing again"
        )
    )]
    SessionConflict { title: String },

    #[error("No install is pending")]
    #[diagnostic(code(bundlekeeper::session::none_pending))]
    NoPendingSession,

    #[error("Extraction of '{title}' failed: {message}")]
    #[diagnostic(code(bundlekeeper::session::extraction_failed))]
    ExtractionFailed { title: String, message: String },

    // Version control errors
    #[error("Version control operation '{operation}' failed: {message}")]
    #[diagnostic(
        code(bundlekeeper::vcs::operation_failed),
        help("No changes were made to the manifest store")
    )]
    VcsOperationFailed { operation: String, message: String },

    // Project errors
    #[error("Project not found at: {path}")]
    #[diagnostic(
        code(bundlekeeper::project::not_found),
        help("Run 'bundlekeeper install' from the project root or pass --project")
    )]
    ProjectNotFound { path: String },

    #[error("Bundle '{title}' is not installed")]
    #[diagnostic(
        code(bundlekeeper::manifest::not_found),
        help("Run 'bundlekeeper list' to see installed bundles")
    )]
    ManifestNotFound { title: String },

    // CLI errors
    #[error("Unknown shell: {shell}")]
    #[diagnostic(
        code(bundlekeeper::cli::unknown_shell),
        help("Supported shells: bash, elvish, fish, powershell, zsh")
    )]
    UnknownShell { shell: String },

    // Configuration errors
    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(bundlekeeper::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(bundlekeeper::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(bundlekeeper::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(bundlekeeper::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(bundlekeeper::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(bundlekeeper::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(bundlekeeper::fs::io_error))]
    IoError { message: String },
}

impl BundleError {
    /// Whether the error leaves the operation usable with a fallback
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BundleError::MetadataMissing)
    }
}

impl From<std::io::Error> for BundleError {
    fn from(err: std::io::Error) -> Self {
        BundleError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for BundleError {
    fn from(err: serde_yaml::Error) -> Self {
        BundleError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BundleError {
    fn from(err: serde_json::Error) -> Self {
        BundleError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for BundleError {
    fn from(err: git2::Error) -> Self {
        BundleError::VcsOperationFailed {
            operation: "git".to_string(),
            message: err.message().to_string(),
        }
    }
}

impl From<inquire::InquireError> for BundleError {
    fn from(err: inquire::InquireError) -> Self {
        BundleError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, BundleError>;
