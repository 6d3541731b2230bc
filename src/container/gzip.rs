//! Gzip header and extra-field reader
//!
//! Bundles carry their JSON metadata in an application subfield of the gzip
//! FEXTRA section, so it can be read without inflating the payload.

use std::io::Read;

use crate::error::{BundleError, Result, invalid_container_format};

/// Gzip magic bytes
pub const GZIP_MAGIC: [u8; 2] = [31, 139];

/// Size of the fixed gzip header
pub const GZIP_HEADER_LEN: usize = 10;

/// FLG bit signalling an extra-field section
pub const FLAG_EXTRA: u8 = 0x04;

/// Subfield id carrying the bundle metadata blob
pub const METADATA_SUBFIELD_ID: [u8; 2] = *b"AB";

const FLAGS_OFFSET: usize = 3;
const SUBFIELD_HEADER_LEN: usize = 4;

/// Read the metadata blob from a gzip stream positioned at its start.
///
/// Returns an empty string when the header carries no extra section, and
/// [`BundleError::MetadataMissing`] when the section exists but holds no
/// metadata subfield. `source` names the stream in error messages.
pub fn read_metadata<R: Read>(reader: &mut R, source: &str) -> Result<String> {
    let mut header = [0u8; GZIP_HEADER_LEN];
    read_exact_or(reader, &mut header, || {
        invalid_container_format(source, "stream is shorter than a gzip header")
    })?;

    if header[..2] != GZIP_MAGIC {
        return Err(invalid_container_format(
            source,
            format!(
                "bad gzip magic {:#04x} {:#04x}",
                header[0], header[1]
            ),
        ));
    }

    if header[FLAGS_OFFSET] & FLAG_EXTRA == 0 {
        return Ok(String::new());
    }

    let mut xlen = [0u8; 2];
    read_exact_or(reader, &mut xlen, || {
        invalid_container_format(source, "missing extra-field length")
    })?;
    let mut remaining = usize::from(u16::from_le_bytes(xlen));

    while remaining >= SUBFIELD_HEADER_LEN {
        let mut subfield = [0u8; SUBFIELD_HEADER_LEN];
        read_exact_or(reader, &mut subfield, || {
            invalid_container_format(source, "extra field ends inside a subfield header")
        })?;
        remaining -= SUBFIELD_HEADER_LEN;

        let len = usize::from(u16::from_le_bytes([subfield[2], subfield[3]]));
        if len > remaining {
            return Err(invalid_container_format(
                source,
                format!("extra subfield of {len} bytes overruns the extra field"),
            ));
        }

        let mut payload = vec![0u8; len];
        read_exact_or(reader, &mut payload, || {
            invalid_container_format(source, "extra field ends inside a subfield payload")
        })?;
        remaining -= len;

        if subfield[..2] == METADATA_SUBFIELD_ID {
            return Ok(String::from_utf8_lossy(&payload).into_owned());
        }
    }

    Err(BundleError::MetadataMissing)
}

fn read_exact_or<R, F>(reader: &mut R, buf: &mut [u8], err: F) -> Result<()>
where
    R: Read,
    F: FnOnce() -> BundleError,
{
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(err()),
        Err(e) => Err(e.into()),
    }
}
