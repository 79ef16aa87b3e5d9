use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::RitError;
use sha1::{Digest, Sha1};
use std::io::Write;

/// Write-side wrapper that digests every byte on its way to the file, so
/// the trailing SHA-1 always covers exactly what was written.
#[derive(Debug)]
pub struct Checksum<W> {
    inner: W,
    digest: Sha1,
}

impl<W: Write> Checksum<W> {
    pub fn new(inner: W) -> Self {
        Checksum {
            inner,
            digest: Sha1::new(),
        }
    }

    pub fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.inner.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    /// Append the digest over everything written so far and hand back the
    /// inner writer.
    pub fn finish(mut self) -> anyhow::Result<W> {
        let checksum = self.digest.finalize();
        self.inner.write_all(checksum.as_slice())?;
        Ok(self.inner)
    }
}

/// Verify the trailing SHA-1 of a fully loaded index buffer and return the
/// covered bytes.
pub fn verify_trailer(data: &[u8]) -> anyhow::Result<&[u8]> {
    if data.len() < CHECKSUM_SIZE {
        return Err(RitError::CorruptIndex("missing checksum trailer".to_string()).into());
    }

    let (body, expected) = data.split_at(data.len() - CHECKSUM_SIZE);
    let actual = Sha1::digest(body);

    if actual.as_slice() != expected {
        return Err(RitError::CorruptIndex("checksum mismatch".to_string()).into());
    }

    Ok(body)
}
