//! Compression families wrapping a tar stream.
//!
//! Diagnostic tools ship bundles as plain tar or tar compressed with one of
//! a handful of codecs. The family is always detected from content (see
//! [`super::detect`]); file extensions are not trusted.

use std::io::BufRead;
use std::io::Read;

/// Compression family of a tar container.
///
/// # Examples
///
/// ```
/// use diagarch_core::formats::Compression;
///
/// assert_eq!(Compression::Xz.name(), "xz");
/// assert!(!Compression::None.is_compressed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed tar.
    None,
    /// Gzip (deflate), e.g. `.tar.gz` supportconfigs and older sosreports.
    Gzip,
    /// Bzip2, e.g. `.tar.bz2` sosreports from RHEL 5/6 era tooling.
    Bzip2,
    /// Xz (LZMA2), the sosreport default.
    Xz,
    /// Zstandard.
    Zstd,
}

impl Compression {
    /// Returns a human-readable name for this family.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }

    /// Returns `true` unless this is a plain tar stream.
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Wraps `reader` in the matching decoder.
    ///
    /// Multi-member gzip, bzip2 and xz streams (produced by parallel
    /// compressors such as `pigz` or `pxz`) are decoded in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder cannot be initialized.
    pub fn decoder<'a, R>(self, reader: R) -> std::io::Result<Box<dyn Read + 'a>>
    where
        R: BufRead + 'a,
    {
        Ok(match self {
            Self::None => Box::new(reader),
            Self::Gzip => Box::new(flate2::bufread::MultiGzDecoder::new(reader)),
            Self::Bzip2 => Box::new(bzip2::bufread::MultiBzDecoder::new(reader)),
            Self::Xz => Box::new(xz2::bufread::XzDecoder::new_multi_decoder(reader)),
            Self::Zstd => Box::new(zstd::stream::read::Decoder::with_buffer(reader)?),
        })
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
