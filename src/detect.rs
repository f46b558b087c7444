//! PDF header sniffing and file-name checks.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers accept a header anywhere in the first kilobyte.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Read the header of a file and return its PDF version (e.g. "1.7").
pub fn detect_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_SEARCH_WINDOW);
    file.take(HEADER_SEARCH_WINDOW as u64)
        .read_to_end(&mut header)?;
    detect_version_from_bytes(&header)
}

/// Return the PDF version declared by the header in `data`.
pub fn detect_version_from_bytes(data: &[u8]) -> Result<String> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let version_start = start + PDF_MAGIC.len();
    let version = data
        .get(version_start..version_start + 3)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Whether the path names a `.pdf` file (extension compared case-insensitively).
pub fn has_pdf_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
