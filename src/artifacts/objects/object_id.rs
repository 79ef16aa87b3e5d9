//! Object identifier (SHA-1 hash, rendered as 40 hex chars).
//!
//! Objects live under `.git/objects/<first-2-chars>/<remaining-38-chars>`,
//! so the id doubles as the storage path.

use crate::artifacts::objects::{OBJECT_ID_LENGTH, OBJECT_ID_RAW_LENGTH};
use std::io;
use std::path::PathBuf;

pub const NULL_OID: &str = "0000000000000000000000000000000000000000";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate a 40-char hexadecimal object id.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("invalid object id length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("invalid object id characters: {}", id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// The all-zeros id used by the wire protocol for absent refs.
    pub fn zero() -> Self {
        Self(NULL_OID.to_string())
    }

    /// Write the id in binary form (20 bytes), as trees, index entries and
    /// packfiles store it.
    pub fn write_raw_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        writer.write_all(&self.as_raw_bytes()?)?;
        Ok(())
    }

    pub fn as_raw_bytes(&self) -> anyhow::Result<[u8; OBJECT_ID_RAW_LENGTH]> {
        let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
        for (i, chunk) in raw.iter_mut().enumerate() {
            *chunk = u8::from_str_radix(&self.0[2 * i..2 * i + 2], 16)
                .map_err(|_| anyhow::anyhow!("invalid hex digit in object id"))?;
        }
        Ok(raw)
    }

    /// Read a binary id (20 bytes) back into hex form.
    pub fn read_raw_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
        reader.read_exact(&mut raw)?;
        Ok(Self::from_raw_bytes(&raw))
    }

    pub fn from_raw_bytes(raw: &[u8; OBJECT_ID_RAW_LENGTH]) -> Self {
        let mut hex = String::with_capacity(OBJECT_ID_LENGTH);
        for byte in raw {
            hex.push_str(&format!("{byte:02x}"));
        }
        Self(hex)
    }

    /// Storage path relative to the objects directory: `ab/cdef…`.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Standard 7-char abbreviation.
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
