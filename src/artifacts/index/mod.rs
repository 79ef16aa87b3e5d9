//! Binary index (staging area) file format, version 2.
//!
//! ```text
//! Header (12 bytes): "DIRC", version, entry count
//! Entries: sorted by path bytes, each padded to 8-byte alignment
//! Extensions: tolerated and ignored on read, never written
//! Checksum (20 bytes): SHA-1 of all preceding bytes
//! ```

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of the trailing SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of the index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &[u8; 4] = b"DIRC";

/// Index version this implementation writes
pub const VERSION: u32 = 2;

/// Index versions recognized on read (only v2 entries are parsed)
pub const KNOWN_VERSIONS: [u32; 3] = [2, 3, 4];
