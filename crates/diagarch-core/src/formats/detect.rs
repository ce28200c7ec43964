//! Compression detection by content sniffing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::Compression;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Bzip2 magic bytes (`BZh`).
const BZIP2_MAGIC: [u8; 3] = [0x42, 0x5A, 0x68];

/// Xz magic bytes.
const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// Zstandard frame magic bytes.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Longest magic number we look for.
const SNIFF_LEN: usize = 6;

/// Classifies the leading bytes of a file.
///
/// Anything that is not a known compression header is reported as
/// [`Compression::None`]; the tar reader decides later whether the bytes
/// are a readable tar stream.
///
/// # Examples
///
/// ```
/// use diagarch_core::formats::Compression;
/// use diagarch_core::formats::detect::sniff;
///
/// assert_eq!(sniff(&[0x1F, 0x8B, 0x08]), Compression::Gzip);
/// assert_eq!(sniff(b"BZh91AY"), Compression::Bzip2);
/// assert_eq!(sniff(b"sosreport"), Compression::None);
/// ```
#[must_use]
pub fn sniff(header: &[u8]) -> Compression {
    if header.starts_with(&XZ_MAGIC) {
        Compression::Xz
    } else if header.starts_with(&ZSTD_MAGIC) {
        Compression::Zstd
    } else if header.starts_with(&BZIP2_MAGIC) {
        Compression::Bzip2
    } else if header.starts_with(&GZIP_MAGIC) {
        Compression::Gzip
    } else {
        Compression::None
    }
}

/// Detects the compression family of the file at `path`.
///
/// Only the first few bytes are read; the file is closed before returning.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn detect_compression(path: &Path) -> std::io::Result<Compression> {
    let mut file = File::open(path)?;
    let mut header = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        match file.read(&mut header[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(sniff(&header[..filled]))
}
