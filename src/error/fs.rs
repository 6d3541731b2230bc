//! File system errors

use super::BundleError;

/// Creates a file read error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> BundleError {
    BundleError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a file write error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> BundleError {
    BundleError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
