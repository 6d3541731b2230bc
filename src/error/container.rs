//! Container read errors

use super::BundleError;

/// Creates an invalid container format error
pub fn invalid_format(path: impl Into<String>, reason: impl Into<String>) -> BundleError {
    BundleError::InvalidContainerFormat {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a truncated archive error
pub fn truncated(path: impl Into<String>, reason: impl Into<String>) -> BundleError {
    BundleError::TruncatedArchive {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a malformed size error
pub fn malformed_size(entry: impl Into<String>, value: impl Into<String>) -> BundleError {
    BundleError::MalformedSize {
        entry: entry.into(),
        value: value.into(),
    }
}
