//! In-memory packfile building for `push`.
//!
//! Layout: `PACK`, version 2, object count, then one entry per object (a
//! (type, size) varint header followed by the zlib-compressed payload), and
//! a trailing SHA-1 over everything before it. Only non-delta entries are
//! produced.

use crate::areas::database::Database;
use crate::artifacts::objects::object::hash_bytes;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;

const PACK_SIGNATURE: &[u8; 4] = b"PACK";
const PACK_VERSION: u32 = 2;

/// Serialize the given objects into a version-2 pack.
pub fn build_pack(database: &Database, oids: &[ObjectId]) -> anyhow::Result<Bytes> {
    let mut pack = Vec::new();

    pack.extend_from_slice(PACK_SIGNATURE);
    pack.extend_from_slice(&PACK_VERSION.to_be_bytes());
    pack.extend_from_slice(&(oids.len() as u32).to_be_bytes());

    for oid in oids {
        let (object_type, payload) = database.load(oid)?;

        write_entry_header(&mut pack, object_type.pack_type(), payload.len());

        let mut encoder =
            flate2::write::ZlibEncoder::new(&mut pack, flate2::Compression::default());
        encoder
            .write_all(&payload)
            .with_context(|| format!("unable to compress pack entry {oid}"))?;
        encoder.finish()?;
    }

    let checksum = hash_bytes(&pack);
    pack.extend_from_slice(&checksum.as_raw_bytes()?);

    Ok(Bytes::from(pack))
}

/// Entry header: low nibble of the size and the 3-bit type in the first
/// byte, remaining size bits in little-endian base-128 continuation bytes.
fn write_entry_header(buffer: &mut Vec<u8>, pack_type: u8, size: usize) {
    let mut first = (pack_type << 4) | (size as u8 & 0x0F);
    let mut remaining = size >> 4;
    if remaining > 0 {
        first |= 0x80;
    }
    buffer.push(first);

    while remaining > 0 {
        let mut byte = (remaining & 0x7F) as u8;
        remaining >>= 7;
        if remaining > 0 {
            byte |= 0x80;
        }
        buffer.push(byte);
    }
}
