//! Index entry codec.
//!
//! Each entry carries the cached stat metadata that lets status skip
//! re-hashing unchanged files, the blob id, and the repo-relative path.
//! The binary layout is a 62-byte head (ten network-order u32 fields, the
//! 20-byte id, a 16-bit flags word) followed by the NUL-terminated path,
//! zero-padded so the whole entry is a multiple of 8 bytes long.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

/// Name length is capped in the flags word; longer paths rely on the NUL.
const MAX_PATH_SIZE: usize = 0xFFF;

/// Entries are padded to this alignment
pub const ENTRY_BLOCK: usize = 8;

/// Fixed-size entry head before the path bytes
pub const ENTRY_HEAD_SIZE: usize = 62;

/// Smallest possible whole entry (head + 1-byte path + padding)
pub const ENTRY_MIN_SIZE: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Repo-relative path with `/` separators
    pub path: String,
    /// Blob id of the staged content
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Cumulative directory prefixes: `a/b/c` yields `a`, `a/b`.
    pub fn parent_dirs(&self) -> Vec<&str> {
        let mut dirs = Vec::new();
        for (i, byte) in self.path.bytes().enumerate() {
            if byte == b'/' {
                dirs.push(&self.path[..i]);
            }
        }
        dirs
    }

    /// Cheap part of the stat shortcut: size, inode, and mode.
    pub fn stat_match(&self, stat: &EntryMetadata) -> bool {
        self.metadata.size == stat.size
            && self.metadata.ino == stat.ino
            && self.metadata.mode == stat.mode
    }

    /// Timestamp part of the stat shortcut.
    pub fn times_match(&self, stat: &EntryMetadata) -> bool {
        self.metadata.mtime == stat.mtime && self.metadata.mtime_nsec == stat.mtime_nsec
    }

    fn flags(&self) -> u16 {
        self.path.len().min(MAX_PATH_SIZE) as u16
    }

    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(ENTRY_MIN_SIZE);
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino as u32)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mode.as_u32())?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_raw_to(&mut bytes)?;
        bytes.write_u16::<byteorder::NetworkEndian>(self.flags())?;
        bytes.write_all(self.path.as_bytes())?;

        // at least one NUL terminator, then pad to the block size
        bytes.push(0);
        while bytes.len() % ENTRY_BLOCK != 0 {
            bytes.push(0);
        }

        Ok(Bytes::from(bytes))
    }

    /// Parse one entry from the start of `bytes`; returns the entry and the
    /// number of bytes it occupied (including padding).
    pub fn deserialize(bytes: &[u8]) -> anyhow::Result<(Self, usize)> {
        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(anyhow::anyhow!("truncated index entry"));
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]) as i64;
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]) as i64;
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]) as i64;
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]) as i64;
        let dev = byteorder::NetworkEndian::read_u32(&bytes[16..20]) as u64;
        let ino = byteorder::NetworkEndian::read_u32(&bytes[20..24]) as u64;
        let mode = EntryMode::try_from_u32(byteorder::NetworkEndian::read_u32(&bytes[24..28]))?;
        let uid = byteorder::NetworkEndian::read_u32(&bytes[28..32]);
        let gid = byteorder::NetworkEndian::read_u32(&bytes[32..36]);
        let size = byteorder::NetworkEndian::read_u32(&bytes[36..40]) as u64;
        let mut raw_oid = &bytes[40..60];
        let oid = ObjectId::read_raw_from(&mut raw_oid)?;
        let _flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]);

        let path_end = bytes[ENTRY_HEAD_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow::anyhow!("unterminated index entry path"))?;
        let path = std::str::from_utf8(&bytes[ENTRY_HEAD_SIZE..ENTRY_HEAD_SIZE + path_end])
            .map_err(|_| anyhow::anyhow!("index entry path is not UTF-8"))?
            .to_string();

        // round the consumed length up to the block size, NUL included
        let consumed = (ENTRY_HEAD_SIZE + path_end + ENTRY_BLOCK) / ENTRY_BLOCK * ENTRY_BLOCK;
        if consumed > bytes.len() {
            return Err(anyhow::anyhow!("truncated index entry padding"));
        }

        Ok((
            IndexEntry {
                path,
                oid,
                metadata: EntryMetadata {
                    ctime,
                    ctime_nsec,
                    mtime,
                    mtime_nsec,
                    dev,
                    ino,
                    mode,
                    uid,
                    gid,
                    size,
                },
            },
            consumed,
        ))
    }

    /// Entry synthesized from a tree, with no stat cache; used by
    /// `restore --staged` and `reset --mixed`.
    pub fn from_tree_entry(path: String, oid: ObjectId, mode: EntryMode) -> Self {
        IndexEntry {
            path,
            oid,
            metadata: EntryMetadata {
                mode,
                ..EntryMetadata::default()
            },
        }
    }
}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.path.cmp(&other.path)
    }
}

/// Cached stat fields, matching the on-disk entry head.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: i64,
    pub ctime_nsec: i64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub dev: u64,
    pub ino: u64,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
}
