//! Categorical path resolution.
//!
//! A category names a logical artifact (mount table, LVM report, disk
//! usage) whose location varies between collection tools and versions. A
//! [`CategorySpec`] lists the places to look; [`CategoryPathResolver`]
//! finds what exists.

mod category;
mod pattern;
mod resolver;
mod result;

pub use category::CategorySpec;
pub use category::PathCandidate;
pub use pattern::matches_pattern;
pub use resolver::CategoryPathResolver;
pub use result::CategoryDataset;
pub use result::CategoryResult;
