//! The staging area.
//!
//! Entries are keyed by their repo-relative path string, so iteration order
//! is the memcmp order the on-disk format requires. A parallel
//! directory-to-children map keeps file/directory conflicts resolvable and
//! answers "is anything tracked under this directory" queries.
//!
//! Writes go through `.git/index.lock` (created exclusively, then renamed
//! over the index after an fsync), so concurrent readers observe either the
//! old or the new index, never a torn one.

use crate::artifacts::index::checksum::{verify_trailer, Checksum};
use crate::artifacts::index::index_entry::{IndexEntry, ENTRY_MIN_SIZE};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, KNOWN_VERSIONS, VERSION};
use crate::errors::RitError;
use anyhow::Context;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

const LOCK_SUFFIX: &str = ".lock";

#[derive(Debug)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    /// Tracked files keyed by repo-relative path
    entries: BTreeMap<String, IndexEntry>,
    /// Directory path -> paths of entries beneath it
    children: BTreeMap<String, BTreeSet<String>>,
    /// Set when the in-memory state has diverged from disk
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// True when the path is a tracked file or a directory with tracked
    /// files beneath it.
    pub fn is_tracked(&self, path: &str) -> bool {
        self.entries.contains_key(path) || self.children.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.changed = false;
    }

    /// Load the index from disk. A missing file is an empty index.
    pub fn load(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let data = std::fs::read(&self.path)
            .with_context(|| format!("unable to read index file {}", self.path.display()))?;
        if data.is_empty() {
            return Ok(());
        }

        let body = verify_trailer(&data)?;
        let header = IndexHeader::deserialize(body)?;

        if !KNOWN_VERSIONS.contains(&header.version) {
            return Err(
                RitError::CorruptIndex(format!("unknown version {}", header.version)).into(),
            );
        }
        if header.version != VERSION {
            return Err(RitError::CorruptIndex(format!(
                "unsupported version {} (only {} can be parsed)",
                header.version, VERSION
            ))
            .into());
        }

        let mut offset = HEADER_SIZE;
        for _ in 0..header.entries_count {
            if body.len() < offset + ENTRY_MIN_SIZE {
                return Err(RitError::CorruptIndex("truncated entry table".to_string()).into());
            }
            let (entry, consumed) = IndexEntry::deserialize(&body[offset..])
                .map_err(|err| RitError::CorruptIndex(err.to_string()))?;
            offset += consumed;
            self.store_entry(entry);
        }

        // anything after the entry table is an extension; tolerated, ignored
        self.changed = false;
        Ok(())
    }

    /// Write the index atomically through `index.lock`.
    pub fn save(&mut self) -> anyhow::Result<()> {
        let lock_path = {
            let mut file_name = self
                .path
                .file_name()
                .context("index path has no file name")?
                .to_os_string();
            file_name.push(LOCK_SUFFIX);
            self.path.with_file_name(file_name)
        };

        let lock_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::AlreadyExists => anyhow::anyhow!(
                    "unable to create '{}': another process holds the index lock",
                    lock_path.display()
                ),
                _ => anyhow::Error::from(err).context("unable to create index lock file"),
            })?;

        let result = self.write_to(lock_file);
        match result {
            Ok(file) => {
                file.sync_all()?;
                std::fs::rename(&lock_path, &self.path)
                    .context("unable to rename index lock into place")?;
                self.changed = false;
                Ok(())
            }
            Err(err) => {
                let _ = std::fs::remove_file(&lock_path);
                Err(err)
            }
        }
    }

    fn write_to(&self, file: std::fs::File) -> anyhow::Result<std::fs::File> {
        let mut writer = Checksum::new(file);

        let header = IndexHeader::new(self.entries.len() as u32);
        writer.write(&header.serialize()?)?;

        for entry in self.entries.values() {
            writer.write(&entry.serialize()?)?;
        }

        writer.finish()
    }

    /// Insert or replace an entry, evicting anything it conflicts with: a
    /// file entry shadowed by one of its parent directories, or the whole
    /// subtree when a directory is replaced by a file.
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.changed = true;
    }

    pub fn remove(&mut self, path: &str) {
        self.remove_entry(path);
        self.remove_children(path);
        self.changed = true;
    }

    /// Refresh the cached stat of an unchanged entry (the racy-clean case
    /// where content matched but timestamps did not).
    pub fn update_entry_stat(
        &mut self,
        path: &str,
        stat: crate::artifacts::index::index_entry::EntryMetadata,
    ) {
        if let Some(entry) = self.entries.get_mut(path) {
            entry.metadata = stat;
            self.changed = true;
        }
    }

    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            let parent = parent.to_string();
            self.remove_entry(&parent);
        }
        self.remove_children(&entry.path);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_string())
                .or_default()
                .insert(entry.path.clone());
        }
        self.entries.insert(entry.path.clone(), entry);
    }

    fn remove_entry(&mut self, path: &str) {
        if let Some(entry) = self.entries.remove(path) {
            for parent in entry.parent_dirs() {
                if let Some(children) = self.children.get_mut(parent) {
                    children.remove(path);
                    if children.is_empty() {
                        let parent = parent.to_string();
                        self.children.remove(&parent);
                    }
                }
            }
        }
    }

    fn remove_children(&mut self, path: &str) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    /// Throw away the current entries and rebuild from the given set, as
    /// `checkout` and `reset --mixed` do.
    pub fn replace(&mut self, entries: impl Iterator<Item = IndexEntry>) {
        self.entries.clear();
        self.children.clear();
        for entry in entries {
            self.store_entry(entry);
        }
        self.changed = true;
    }

    /// Tracked paths equal to or beneath the given path (`.` means all).
    pub fn paths_under(&self, path: &str) -> Vec<String> {
        if path == "." || path.is_empty() {
            return self.entries.keys().cloned().collect();
        }
        let prefix = format!("{path}/");
        self.entries
            .keys()
            .filter(|entry_path| *entry_path == path || entry_path.starts_with(&prefix))
            .cloned()
            .collect()
    }
}
