//! One side of a textual diff: a blob out of the index, the file in the
//! worktree, or nothing (for additions and deletions).

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use std::path::{Path, PathBuf};

const NULL_PATH: &str = "/dev/null";

#[derive(Debug, Clone)]
pub struct DiffTarget {
    pub file: PathBuf,
    pub oid: ObjectId,
    pub mode: Option<EntryMode>,
    pub data: Vec<String>,
}

impl DiffTarget {
    pub fn from_index(
        path: &str,
        index: &Index,
        database: &Database,
    ) -> anyhow::Result<Self> {
        let entry = index
            .entry_by_path(path)
            .ok_or_else(|| anyhow::anyhow!("'{path}' is not tracked"))?;
        let blob = database
            .parse_object_as_blob(&entry.oid)?
            .ok_or_else(|| anyhow::anyhow!("index entry '{path}' does not point to a blob"))?;

        Ok(Self {
            file: PathBuf::from(path),
            oid: entry.oid.clone(),
            mode: Some(entry.metadata.mode),
            data: blob.lines(),
        })
    }

    pub fn from_file(path: &str, workspace: &Workspace) -> anyhow::Result<Self> {
        let blob = workspace.parse_blob(path)?;
        let oid = blob.object_id()?;
        let mode = workspace
            .stat_file(path)?
            .ok_or_else(|| anyhow::anyhow!("'{path}' does not exist"))?
            .mode;

        Ok(Self {
            file: PathBuf::from(path),
            oid,
            mode: Some(mode),
            data: blob.lines(),
        })
    }

    pub fn from_nothing(path: &str) -> Self {
        Self {
            file: PathBuf::from(path),
            oid: ObjectId::zero(),
            mode: None,
            data: Vec::new(),
        }
    }

    /// The `---`/`+++` path: `a/<file>` style, or `/dev/null` when absent.
    pub fn diff_path(&self) -> PathBuf {
        if self.mode.is_some() {
            self.file.clone()
        } else {
            Path::new(NULL_PATH).to_path_buf()
        }
    }

    pub fn pretty_mode(&self) -> &'static str {
        match self.mode {
            Some(mode) => mode.as_str(),
            None => "100644",
        }
    }
}
