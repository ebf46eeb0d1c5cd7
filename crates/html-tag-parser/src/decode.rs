//! Best-effort decoding of input files.

use std::path::Path;

use reptile_core::{ReptileError, ReptileResult};

/// Read `path` as text. Invalid UTF-8 falls back to Latin-1, which maps
/// every byte to the code point of the same value and therefore never fails.
pub fn read_text(path: &Path) -> ReptileResult<String> {
    let bytes = std::fs::read(path).map_err(|e| ReptileError::io(path, e))?;
    Ok(decode_bytes(bytes, path))
}

fn decode_bytes(bytes: Vec<u8>, path: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                "{} is not valid UTF-8 ({}), decoding as Latin-1",
                path.display(),
                e.utf8_error()
            );
            latin1(e.as_bytes())
        }
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
