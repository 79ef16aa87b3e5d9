use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::errors::RitError;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;

/// 12-byte index file header: signature, version, entry count.
#[derive(Debug, Clone)]
pub struct IndexHeader {
    pub version: u32,
    pub entries_count: u32,
}

impl IndexHeader {
    pub fn new(entries_count: u32) -> Self {
        IndexHeader {
            version: VERSION,
            entries_count,
        }
    }

    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(SIGNATURE);
        bytes.write_u32::<byteorder::NetworkEndian>(self.version)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.entries_count)?;
        Ok(Bytes::from(bytes))
    }

    pub fn deserialize(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(RitError::CorruptIndex("file is too short".to_string()).into());
        }
        if &bytes[0..4] != SIGNATURE {
            return Err(RitError::CorruptIndex("invalid signature".to_string()).into());
        }

        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        let entries_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]);

        Ok(IndexHeader {
            version,
            entries_count,
        })
    }
}
