//! Command implementations, split the way Git splits its manual:
//!
//! - `plumbing`: object-level commands (hash-object, cat-file, ls-files,
//!   write-tree, rev-parse)
//! - `porcelain`: the user-facing workflow commands

pub mod plumbing;
pub mod porcelain;
