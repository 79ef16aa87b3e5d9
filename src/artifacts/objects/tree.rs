//! Tree object: a directory snapshot.
//!
//! On disk: `tree <size>\0` followed by `<mode> <name>\0<20-byte-id>` per
//! entry. Entries are ordered by name with `/` appended to directory names,
//! which is why a directory `foo` sorts after a file `foo.c` even though
//! plain byte order says otherwise. Building keeps directory keys with their
//! trailing slash so the map order *is* the serialized order.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::{frame, Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone)]
enum TreeNode {
    File(DatabaseEntry),
    Directory(Tree),
}

impl TreeNode {
    fn mode(&self) -> EntryMode {
        match self {
            TreeNode::File(entry) => entry.mode,
            TreeNode::Directory(_) => EntryMode::Directory,
        }
    }

    fn oid(&self) -> anyhow::Result<ObjectId> {
        match self {
            TreeNode::File(entry) => Ok(entry.oid.clone()),
            TreeNode::Directory(tree) => tree.object_id(),
        }
    }
}

/// A tree holds two entry sets: `readable_entries` when loaded from the
/// database (kept in stored order), `writeable_entries` when folded up
/// from the index.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    readable_entries: Vec<(String, DatabaseEntry)>,
    writeable_entries: BTreeMap<String, TreeNode>,
}

impl Tree {
    /// Fold a flat, sorted sequence of `(path, entry)` pairs into a nested
    /// tree. Paths use `/` separators relative to the repository root.
    pub fn build<'a>(
        entries: impl Iterator<Item = (&'a str, DatabaseEntry)>,
    ) -> anyhow::Result<Self> {
        let mut root = Self::default();

        for (path, entry) in entries {
            let components = path.split('/').collect::<Vec<_>>();
            root.add_entry(&components, entry)?;
        }

        Ok(root)
    }

    fn add_entry(&mut self, components: &[&str], entry: DatabaseEntry) -> anyhow::Result<()> {
        match components {
            [] => Err(anyhow::anyhow!("empty path in tree entry")),
            [name] => {
                self.writeable_entries
                    .insert((*name).to_string(), TreeNode::File(entry));
                Ok(())
            }
            [dir, rest @ ..] => {
                // directory keys carry the trailing slash used for ordering
                let key = format!("{dir}/");
                let node = self
                    .writeable_entries
                    .entry(key)
                    .or_insert_with(|| TreeNode::Directory(Tree::default()));
                match node {
                    TreeNode::Directory(tree) => tree.add_entry(rest, entry),
                    TreeNode::File(_) => Err(anyhow::anyhow!(
                        "index entry conflicts with directory '{dir}'"
                    )),
                }
            }
        }
    }

    /// Post-order traversal: children are visited before their parent, so a
    /// parent's entry ids are resolvable by the time it is stored.
    pub fn traverse<F>(&self, func: &F) -> anyhow::Result<()>
    where
        F: Fn(&Tree) -> anyhow::Result<()>,
    {
        for node in self.writeable_entries.values() {
            if let TreeNode::Directory(tree) = node {
                tree.traverse(func)?;
            }
        }
        func(self)
    }

    /// Entries of a tree loaded from the database, in stored order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &DatabaseEntry)> {
        self.readable_entries
            .iter()
            .map(|(name, entry)| (name, entry))
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content = Vec::new();

        for (name, node) in &self.writeable_entries {
            let name = name.trim_end_matches('/');
            let header = format!("{} {}", node.mode().as_str(), name);
            content.write_all(header.as_bytes())?;
            content.push(0);
            node.oid()?.write_raw_to(&mut content)?;
        }

        Ok(frame(ObjectType::Tree, &content))
    }
}

impl Unpackable for Tree {
    fn deserialize(payload: Bytes) -> anyhow::Result<Self> {
        let mut entries = Vec::new();
        let bytes = payload.as_ref();
        let mut offset = 0;

        while offset < bytes.len() {
            let space = bytes[offset..]
                .iter()
                .position(|&b| b == b' ')
                .context("unexpected end of tree entry mode")?;
            let mode_str = std::str::from_utf8(&bytes[offset..offset + space])?;
            let mode = EntryMode::from_octal_str(mode_str)?;
            offset += space + 1;

            let nul = bytes[offset..]
                .iter()
                .position(|&b| b == 0)
                .context("unexpected end of tree entry name")?;
            let name = std::str::from_utf8(&bytes[offset..offset + nul])?.to_owned();
            offset += nul + 1;

            let mut raw = bytes
                .get(offset..offset + 20)
                .context("unexpected end of tree entry id")?;
            let oid = ObjectId::read_raw_from(&mut raw)?;
            offset += 20;

            entries.push((name, DatabaseEntry::new(oid, mode)));
        }

        Ok(Tree {
            readable_entries: entries,
            writeable_entries: BTreeMap::new(),
        })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.readable_entries
            .iter()
            .map(|(name, entry)| {
                let object_type = if entry.mode.is_tree() { "tree" } else { "blob" };
                format!(
                    "{:0>6} {} {}\t{}",
                    entry.mode.as_str(),
                    object_type,
                    entry.oid,
                    name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use pretty_assertions::assert_eq;

    fn file_entry(byte: u8) -> DatabaseEntry {
        DatabaseEntry::new(
            ObjectId::from_raw_bytes(&[byte; 20]),
            EntryMode::File(FileMode::Regular),
        )
    }

    #[test]
    fn empty_tree_has_the_well_known_id() {
        let tree = Tree::build(std::iter::empty()).unwrap();
        assert_eq!(
            tree.object_id().unwrap().as_ref(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[test]
    fn directory_sorts_after_file_sharing_its_prefix() {
        // "foo/" > "foo.c" bytewise, so the blob must come first
        let entries = vec![
            ("foo", file_entry(1)),
            ("foo.c", file_entry(2)),
            ("foo/bar", file_entry(3)),
        ];
        // "foo" the file is shadowed by "foo" the directory in a real index;
        // feed only the unambiguous pair here
        let tree = Tree::build(entries.into_iter().skip(1)).unwrap();
        let serialized = tree.serialize().unwrap();
        let payload = &serialized[serialized.iter().position(|&b| b == 0).unwrap() + 1..];

        let first_name_end = payload.iter().position(|&b| b == 0).unwrap();
        assert_eq!(&payload[..first_name_end], b"100644 foo.c");

        let rest = &payload[first_name_end + 1 + 20..];
        let second_name_end = rest.iter().position(|&b| b == 0).unwrap();
        assert_eq!(&rest[..second_name_end], b"40000 foo");
    }

    #[test]
    fn nested_entries_round_trip_through_serialization() {
        let tree = Tree::build(
            vec![("a.txt", file_entry(7)), ("b.txt", file_entry(9))].into_iter(),
        )
        .unwrap();
        let serialized = tree.serialize().unwrap();
        let nul = serialized.iter().position(|&b| b == 0).unwrap();
        let parsed = Tree::deserialize(serialized.slice(nul + 1..)).unwrap();

        let names = parsed.entries().map(|(name, _)| name.clone()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn identical_subtrees_share_an_id() {
        let left = Tree::build(vec![("dir/x", file_entry(4))].into_iter()).unwrap();
        let right = Tree::build(vec![("dir/x", file_entry(4))].into_iter()).unwrap();
        assert_eq!(left.object_id().unwrap(), right.object_id().unwrap());
    }
}
