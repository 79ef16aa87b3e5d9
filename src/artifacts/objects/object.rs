//! Core object traits.
//!
//! Every object serializes to `<type> <size>\0<payload>`, is addressed by the
//! SHA-1 of that framing, and is stored zlib-compressed in the database.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};

/// Serialization to Git's on-disk framing (header included).
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Deserialization from an object payload (header already stripped).
pub trait Unpackable {
    fn deserialize(payload: Bytes) -> Result<Self>
    where
        Self: Sized;
}

/// Common operations over all object kinds.
pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Human-readable rendering used by `cat-file -p`.
    fn display(&self) -> String;

    /// Content address: SHA-1 over the serialized framing.
    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        Ok(hash_bytes(&content))
    }
}

/// SHA-1 over already-framed object bytes.
pub fn hash_bytes(content: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(content);
    let digest = hasher.finalize();
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&digest);
    ObjectId::from_raw_bytes(&raw)
}

/// Frame a raw payload as `<type> <size>\0<payload>`.
pub fn frame(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let header = format!("{} {}\0", object_type.as_str(), payload.len());
    let mut framed = Vec::with_capacity(header.len() + payload.len());
    framed.extend_from_slice(header.as_bytes());
    framed.extend_from_slice(payload);
    Bytes::from(framed)
}

/// Hash an arbitrary payload under the given kind, without storing it.
pub fn hash_object(object_type: ObjectType, payload: &[u8]) -> ObjectId {
    hash_bytes(&frame(object_type, payload))
}

/// Type-erased object container for `cat-file` style dispatch.
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blob_hash_matches_git() {
        // git hash-object of a file containing "hello pygit\n"
        let oid = hash_object(ObjectType::Blob, b"hello pygit\n");
        assert_eq!(oid.as_ref(), "40e51761b78f600a29d3e6cd6a373b77d9e112bb");
    }

    #[test]
    fn empty_tree_hash_matches_git() {
        let oid = hash_object(ObjectType::Tree, b"");
        assert_eq!(oid.as_ref(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn distinct_payloads_never_collide_on_framing() {
        // "a" as a blob vs "a" as payload of a longer blob
        let a = hash_object(ObjectType::Blob, b"a");
        let b = hash_object(ObjectType::Blob, b"a\0");
        assert_ne!(a, b);
    }
}
