//! Path types that carry validation guarantees.
//!
//! - [`DestDir`]: canonical extraction target
//! - [`SafePath`]: archive member path sandboxed under a `DestDir`
//! - [`SafeSymlink`]: symlink whose target stays inside a `DestDir`
//! - [`BundleRoot`]: the extracted bundle's top-level directory

mod bundle_root;
mod dest_dir;
mod safe_path;
mod safe_symlink;

pub use bundle_root::BundleRoot;
pub use dest_dir::DestDir;
pub use safe_path::SafePath;
pub use safe_symlink::SafeSymlink;
