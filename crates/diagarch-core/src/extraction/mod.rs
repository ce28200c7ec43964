//! Bundle extraction.

mod engine;
mod quota;
mod root;

pub use engine::ExtractedBundle;
pub use engine::extract_bundle;
