//! Tar container access over any supported compression.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use super::Compression;

/// Read buffer in front of the decoder.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// A tar stream opened through its decoder.
pub type TarStream = tar::Archive<Box<dyn Read>>;

/// Opens `path` as a tar stream decoded with `compression`.
///
/// The returned archive owns the file handle; dropping it releases every
/// resource.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or the decoder cannot be
/// initialized.
pub fn open_tar(path: &Path, compression: Compression) -> std::io::Result<TarStream> {
    let file = File::open(path)?;
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let decoder = compression.decoder(reader)?;
    Ok(tar::Archive::new(decoder))
}
