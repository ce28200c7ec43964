//! Container formats and compression detection.

pub mod compression;
pub mod detect;
pub mod tar;

pub use compression::Compression;
pub use detect::detect_compression;
pub use self::tar::TarStream;
pub use self::tar::open_tar;
