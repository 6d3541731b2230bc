//! BLAKE3 content hashing for tracked files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;

use crate::error::{Result, file_read_failed};

/// Read buffer size for streamed hashing
const CHUNK_SIZE: usize = 8192;

/// Calculate the BLAKE3 hex digest of a file, streamed in fixed chunks
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .map_err(|e| file_read_failed(path.display().to_string(), e.to_string()))?;
    hash_reader(BufReader::new(file), &path.display().to_string())
}

/// Calculate the BLAKE3 hex digest of a reader.
///
/// `source` names the reader in error messages.
pub fn hash_reader<R: Read>(mut reader: R, source: &str) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| file_read_failed(source, e.to_string()))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
