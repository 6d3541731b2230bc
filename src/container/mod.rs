//! Bundle container introspection
//!
//! A bundle is a gzip-compressed TAR stream. The gzip header may carry a
//! JSON metadata blob ([`gzip`]), and the TAR entries describe each asset by
//! a hash directory of marker files ([`tar`]). Neither reader extracts
//! payload bytes.

pub mod gzip;
pub mod tar;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::{BundleError, Result, file_read_failed};

pub use self::gzip::read_metadata;
pub use self::tar::TarEntryCatalog;

/// Open a container file for buffered reading
pub fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BundleError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            file_read_failed(path.display().to_string(), e.to_string())
        }
    })?;
    Ok(BufReader::new(file))
}

/// Read the metadata blob of a container file.
///
/// See [`gzip::read_metadata`] for the empty and missing cases.
pub fn read_container_metadata(path: &Path) -> Result<String> {
    let mut reader = open(path)?;
    read_metadata(&mut reader, &path.display().to_string())
}

/// Catalog the TAR entries of a container file
pub fn read_container_catalog(path: &Path) -> Result<TarEntryCatalog> {
    let mut decoder = GzDecoder::new(open(path)?);
    TarEntryCatalog::read(&mut decoder, &path.display().to_string()).map_err(|e| match e {
        BundleError::IoError { message } => crate::error::truncated_archive(
            path.display().to_string(),
            format!("gzip stream could not be decoded: {message}"),
        ),
        other => other,
    })
}
