//! TAR entry catalog
//!
//! Walks a decompressed TAR stream header by header and reconstructs the
//! logical file list of a bundle from its per-asset marker entries. Bundles
//! store each asset under a hash directory:
//!
//! ```text
//! <hash>/asset        file contents
//! <hash>/asset.meta   metadata companion
//! <hash>/pathname     logical path of the asset (first line)
//! ```
//!
//! Only `pathname` payloads are read; every other payload is skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read};

use tracing::debug;

use crate::error::{Result, malformed_size, truncated_archive};
use crate::path_utils;

/// TAR block size
pub const BLOCK_SIZE: usize = 512;

/// Minimum length of the hash segment of a catalogued entry
pub const MIN_HASH_LEN: usize = 16;

pub(crate) const ASSET_MARKER: &str = "asset";
pub(crate) const META_MARKER: &str = "asset.meta";
pub(crate) const PATHNAME_MARKER: &str = "pathname";

// USTAR header field offsets
const NAME: (usize, usize) = (0, 100);
const SIZE: (usize, usize) = (124, 136);
const MAGIC: (usize, usize) = (257, 263);
const PREFIX: (usize, usize) = (345, 500);

/// Facts gathered for one hash directory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HashBucket {
    pub has_asset: bool,
    pub has_meta: bool,
    pub pathname: Option<String>,
}

/// Catalog of hash buckets found in a TAR stream
#[derive(Debug, Default)]
pub struct TarEntryCatalog {
    buckets: BTreeMap<String, HashBucket>,
}

impl TarEntryCatalog {
    /// Walk `reader` to the terminator header and catalog its marker entries.
    ///
    /// `source` names the stream in error messages.
    pub fn read<R: Read>(reader: &mut R, source: &str) -> Result<Self> {
        let mut catalog = Self::default();
        let mut header = [0u8; BLOCK_SIZE];

        loop {
            match read_block(reader, &mut header) {
                Ok(BlockRead::Full) => {}
                Ok(BlockRead::Eof) => break,
                Ok(BlockRead::Partial(n)) => {
                    return Err(truncated_archive(
                        source,
                        format!("stream ends {n} bytes into a header"),
                    ));
                }
                Err(e) => return Err(e.into()),
            }

            if header.iter().all(|&b| b == 0) {
                break;
            }

            let path = entry_path(&header);
            let size = parse_size(field(&header, SIZE)).ok_or_else(|| {
                malformed_size(
                    path.clone(),
                    String::from_utf8_lossy(field(&header, SIZE)).trim_end_matches('\0'),
                )
            })?;

            match split_marker(&path) {
                Some((hash, PATHNAME_MARKER)) => {
                    let payload = read_payload(reader, size, source, &path)?;
                    let pathname = first_line(&payload);
                    catalog.bucket(hash).pathname = Some(path_utils::normalize(&pathname));
                }
                Some((hash, ASSET_MARKER)) => {
                    catalog.bucket(hash).has_asset = true;
                    skip_payload(reader, size, source, &path)?;
                }
                Some((hash, META_MARKER)) => {
                    catalog.bucket(hash).has_meta = true;
                    skip_payload(reader, size, source, &path)?;
                }
                _ => skip_payload(reader, size, source, &path)?,
            }
        }

        Ok(catalog)
    }

    fn bucket(&mut self, hash: &str) -> &mut HashBucket {
        self.buckets.entry(hash.to_lowercase()).or_default()
    }

    /// Buckets keyed by lowercase hash
    pub fn buckets(&self) -> &BTreeMap<String, HashBucket> {
        &self.buckets
    }

    /// Sorted, deduplicated logical file list.
    ///
    /// Buckets without a `pathname` entry cannot be mapped to a location and
    /// are left out.
    pub fn file_list(&self, meta_extension: &str) -> Vec<String> {
        let mut files = BTreeSet::new();

        for (hash, bucket) in &self.buckets {
            let Some(pathname) = bucket.pathname.as_deref().filter(|p| !p.is_empty()) else {
                debug!(
                    hash = %hash,
                    has_asset = bucket.has_asset,
                    has_meta = bucket.has_meta,
                    "Dropping bundle entry without a pathname"
                );
                continue;
            };

            if bucket.has_asset {
                files.insert(pathname.to_string());
            }
            if bucket.has_meta {
                files.insert(path_utils::meta_path_for(pathname, meta_extension));
            }
        }

        files.into_iter().collect()
    }
}

enum BlockRead {
    Full,
    Eof,
    Partial(usize),
}

fn read_block<R: Read>(reader: &mut R, buf: &mut [u8; BLOCK_SIZE]) -> io::Result<BlockRead> {
    let mut filled = 0;
    while filled < BLOCK_SIZE {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(match filled {
        0 => BlockRead::Eof,
        BLOCK_SIZE => BlockRead::Full,
        n => BlockRead::Partial(n),
    })
}

fn field(header: &[u8; BLOCK_SIZE], (start, end): (usize, usize)) -> &[u8] {
    &header[start..end]
}

fn field_str(header: &[u8; BLOCK_SIZE], range: (usize, usize)) -> String {
    let raw = field(header, range);
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim_end().to_string()
}

/// Logical path of a header, joining the USTAR prefix when present
fn entry_path(header: &[u8; BLOCK_SIZE]) -> String {
    let name = field_str(header, NAME);
    let is_ustar = field(header, MAGIC).starts_with(b"ustar");
    let prefix = if is_ustar {
        field_str(header, PREFIX)
    } else {
        String::new()
    };

    let path = if prefix.is_empty() {
        name
    } else {
        format!("{}/{}", prefix.trim_end_matches('/'), name)
    };

    path.strip_prefix("./").map(str::to_string).unwrap_or(path)
}

/// Parse a TAR numeric field: octal text, or GNU base-256 when the high bit is set
fn parse_size(raw: &[u8]) -> Option<u64> {
    if raw.first().is_some_and(|b| b & 0x80 != 0) {
        let mut value: u64 = u64::from(raw[0] & 0x7f);
        for &b in &raw[1..] {
            value = value.checked_mul(256)?.checked_add(u64::from(b))?;
        }
        return Some(value);
    }

    let text = std::str::from_utf8(raw).ok()?;
    let text = text.trim_matches(|c: char| c == '\0' || c == ' ');
    if text.is_empty() {
        return Some(0);
    }
    u64::from_str_radix(text, 8).ok()
}

/// Split `<hash>/<marker>` into its parts when the hash segment qualifies
pub(crate) fn split_marker(path: &str) -> Option<(&str, &str)> {
    let (hash, marker) = path.split_once('/')?;
    let is_hash = hash.len() >= MIN_HASH_LEN && hash.bytes().all(|b| b.is_ascii_hexdigit());
    if is_hash && !marker.is_empty() {
        Some((hash, marker))
    } else {
        None
    }
}

fn padding_for(size: u64) -> u64 {
    let block = BLOCK_SIZE as u64;
    (block - size % block) % block
}

/// Payload length rounded up to whole blocks
fn padded_len(size: u64, source: &str, entry: &str) -> Result<u64> {
    size.checked_add(padding_for(size)).ok_or_else(|| {
        truncated_archive(
            source,
            format!("entry '{entry}' declares {size} bytes, more than any stream can hold"),
        )
    })
}

fn read_payload<R: Read>(reader: &mut R, size: u64, source: &str, entry: &str) -> Result<Vec<u8>> {
    let padded = padded_len(size, source, entry)?;
    let mut payload = Vec::new();
    let read = reader.by_ref().take(size).read_to_end(&mut payload)?;
    if (read as u64) < size {
        return Err(truncated_archive(
            source,
            format!("entry '{entry}' declares {size} bytes but only {read} remain"),
        ));
    }
    skip_exact(reader, padded - size, source, entry)?;
    Ok(payload)
}

fn skip_payload<R: Read>(reader: &mut R, size: u64, source: &str, entry: &str) -> Result<()> {
    let padded = padded_len(size, source, entry)?;
    skip_exact(reader, padded, source, entry)
}

fn skip_exact<R: Read>(reader: &mut R, len: u64, source: &str, entry: &str) -> Result<()> {
    let skipped = io::copy(&mut reader.by_ref().take(len), &mut io::sink())?;
    if skipped < len {
        return Err(truncated_archive(
            source,
            format!("entry '{entry}' runs past the end of the stream"),
        ));
    }
    Ok(())
}

pub(crate) fn first_line(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    text.lines().next().unwrap_or("").trim_end_matches('\r').to_string()
}
