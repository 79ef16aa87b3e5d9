//! Loose-object database.
//!
//! Objects are stored zlib-compressed under `.git/objects/<aa>/<bb…>` where
//! the path is the SHA-1 of the framed content. Once an object file exists
//! it is never rewritten; new objects land via a temp file in the fanout
//! directory followed by an atomic rename.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::RitError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

/// Shortest accepted abbreviation of an object id
const MIN_PREFIX_LENGTH: usize = 4;

#[derive(Debug)]
pub struct Database {
    /// Path to the objects directory (typically `.git/objects`)
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Store an object unless it already exists. Idempotent.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let content = object.serialize()?;
        self.store_framed(&content)
    }

    /// Store already-framed object bytes under their content address.
    pub fn store_framed(&self, content: &Bytes) -> anyhow::Result<ObjectId> {
        let oid = crate::artifacts::objects::object::hash_bytes(content);
        let object_path = self.path.join(oid.to_path());

        if object_path.exists() {
            return Ok(oid);
        }

        let object_dir = object_path
            .parent()
            .context("object path has no fanout directory")?;
        std::fs::create_dir_all(object_dir)
            .with_context(|| format!("unable to create object directory {}", object_dir.display()))?;

        let compressed = Self::compress(content)?;
        let temp = tempfile::NamedTempFile::new_in(object_dir)
            .context("unable to create temporary object file")?;
        temp.as_file()
            .write_all(&compressed)
            .context("unable to write object file")?;
        temp.as_file().sync_all()?;
        temp.persist(&object_path)
            .with_context(|| format!("unable to persist object file {}", object_path.display()))?;

        Ok(oid)
    }

    /// Load and validate an object, returning its kind and payload.
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let object_path = self.path.join(object_id.to_path());
        if !object_path.is_file() {
            return Err(RitError::ObjectNotFound(object_id.to_string()).into());
        }

        let compressed = std::fs::read(&object_path)
            .with_context(|| format!("unable to read object file {}", object_path.display()))?;
        let content = Self::decompress(&compressed)?;

        let corrupt = |reason: &str| RitError::CorruptObject {
            oid: object_id.to_string(),
            reason: reason.to_string(),
        };

        let nul = content
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| corrupt("missing header terminator"))?;
        let header =
            std::str::from_utf8(&content[..nul]).map_err(|_| corrupt("header is not UTF-8"))?;
        let (type_str, size_str) = header
            .split_once(' ')
            .ok_or_else(|| corrupt("malformed header"))?;

        let object_type = ObjectType::try_parse(type_str)?;
        let declared_size: usize = size_str
            .parse()
            .map_err(|_| corrupt("malformed size field"))?;
        let payload = Bytes::from(content).slice(nul + 1..);

        if payload.len() != declared_size {
            return Err(corrupt(&format!(
                "declared size {declared_size} does not match payload size {}",
                payload.len()
            ))
            .into());
        }

        Ok((object_type, payload))
    }

    /// Load and dispatch on the object kind.
    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, payload) = self.load(object_id)?;

        match object_type {
            ObjectType::Blob | ObjectType::Tag => {
                Ok(ObjectBox::Blob(Box::new(Blob::deserialize(payload)?)))
            }
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(payload)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(payload)?))),
        }
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        let (object_type, payload) = self.load(object_id)?;
        match object_type {
            ObjectType::Blob => Ok(Some(Blob::deserialize(payload)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tree>> {
        let (object_type, payload) = self.load(object_id)?;
        match object_type {
            ObjectType::Tree => Ok(Some(Tree::deserialize(payload)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        let (object_type, payload) = self.load(object_id)?;
        match object_type {
            ObjectType::Commit => Ok(Some(Commit::deserialize(payload)?)),
            _ => Ok(None),
        }
    }

    pub fn object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        Ok(self.load(object_id)?.0)
    }

    /// Resolve an abbreviated id. At least four hex chars are required; a
    /// prefix matching more than one object is an error distinct from a
    /// prefix matching none.
    pub fn resolve_prefix(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        if prefix.len() < MIN_PREFIX_LENGTH || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RitError::ObjectNotFound(prefix.to_string()).into());
        }
        if prefix.len() == 40 {
            let oid = ObjectId::try_parse(prefix.to_string())?;
            return if self.contains(&oid) {
                Ok(oid)
            } else {
                Err(RitError::ObjectNotFound(prefix.to_string()).into())
            };
        }

        let prefix = prefix.to_ascii_lowercase();
        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);

        let mut matches = Vec::new();
        if dir_path.is_dir() {
            for entry in std::fs::read_dir(&dir_path)? {
                let entry = entry?;
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();

                if file_name.starts_with(file_prefix) {
                    if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                        matches.push(oid);
                    }
                }
            }
        }

        match matches.len() {
            0 => Err(RitError::ObjectNotFound(prefix).into()),
            1 => Ok(matches.remove(0)),
            _ => Err(RitError::AmbiguousPrefix(prefix).into()),
        }
    }

    /// Flatten a tree into `path -> (mode, id)` pairs, recursing through
    /// subtrees. Trees form a DAG, so the walk is keyed by id, not pointers.
    pub fn flatten_tree(
        &self,
        tree_oid: &ObjectId,
        prefix: &str,
        out: &mut BTreeMap<String, DatabaseEntry>,
    ) -> anyhow::Result<()> {
        let tree = self
            .parse_object_as_tree(tree_oid)?
            .ok_or_else(|| anyhow::anyhow!("object {tree_oid} is not a tree"))?;

        for (name, entry) in tree.entries() {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            if entry.mode.is_tree() {
                self.flatten_tree(&entry.oid, &path, out)?;
            } else {
                out.insert(path, entry.clone());
            }
        }

        Ok(())
    }

    /// Flattened tree of a commit; the id-to-tree hop in one call.
    pub fn commit_tree_flat(
        &self,
        commit_oid: &ObjectId,
    ) -> anyhow::Result<BTreeMap<String, DatabaseEntry>> {
        let commit = self
            .parse_object_as_commit(commit_oid)?
            .ok_or_else(|| anyhow::anyhow!("object {commit_oid} is not a commit"))?;

        let mut flat = BTreeMap::new();
        self.flatten_tree(commit.tree_oid(), "", &mut flat)?;
        Ok(flat)
    }

    fn compress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .context("unable to compress object content")?;
        encoder
            .finish()
            .map(Bytes::from)
            .context("unable to finish compressing object content")
    }

    fn decompress(data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("unable to decompress object content")?;
        Ok(decompressed)
    }
}
