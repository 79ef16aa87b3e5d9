//! Git object model: blobs, trees, commits and their identifiers.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a rendered object id (40 hex chars)
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a binary object id (20 bytes)
pub const OBJECT_ID_RAW_LENGTH: usize = 20;
