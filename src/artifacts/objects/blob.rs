//! Blob object: raw file bytes, no normalization.
//!
//! On disk: `blob <size>\0<content>`. Filenames and permissions live in
//! trees, never here.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object::frame;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;

#[derive(Debug, Clone, new)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Lines of the blob for line-based diffing; invalid UTF-8 bytes are
    /// replaced rather than rejected.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.content)
            .lines()
            .map(|line| line.to_string())
            .collect()
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(frame(ObjectType::Blob, &self.content))
    }
}

impl Unpackable for Blob {
    fn deserialize(payload: Bytes) -> anyhow::Result<Self> {
        Ok(Self::new(payload))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.content).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serialize_frames_content_with_length() {
        let blob = Blob::new(Bytes::from_static(b"one\n"));
        assert_eq!(blob.serialize().unwrap().as_ref(), b"blob 4\0one\n");
    }

    #[test]
    fn bytes_are_stored_verbatim() {
        let blob = Blob::new(Bytes::from_static(b"a\r\nb\r\n"));
        let payload = Bytes::from_static(b"a\r\nb\r\n");
        let round = Blob::deserialize(payload).unwrap();
        assert_eq!(round.content(), blob.content());
    }
}
