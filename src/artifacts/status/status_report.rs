//! The tri-state scan behind `status`, `diff`, `checkout` and `rm`.
//!
//! Every tracked path is compared on two axes: worktree vs index (unstaged
//! changes) and index vs HEAD tree (staged changes). Worktree equality uses
//! the stat cache first (matching mtime, size and inode mean the content is
//! taken as unchanged) and falls back to re-hashing the file. A clean
//! rehash refreshes the cached stat so the next scan takes the shortcut.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::{HeadState, Refs};
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::ignore::IgnoreRules;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedChange {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorktreeChange {
    Modified,
    Deleted,
}

#[derive(Debug)]
pub struct StatusReport {
    pub branch: Option<BranchName>,
    pub head_oid: Option<ObjectId>,
    /// Index vs HEAD tree
    pub staged: BTreeMap<String, StagedChange>,
    /// Worktree vs index
    pub unstaged: BTreeMap<String, WorktreeChange>,
    /// Present, not tracked, not ignored
    pub untracked: BTreeSet<String>,
    /// Flattened HEAD tree, reused by callers that need it
    pub head_tree: BTreeMap<String, DatabaseEntry>,
}

impl StatusReport {
    pub fn scan(
        workspace: &Workspace,
        database: &Database,
        refs: &Refs,
        index: &mut Index,
        ignore: &IgnoreRules,
    ) -> anyhow::Result<Self> {
        let (branch, head_oid) = match refs.read_head_state()? {
            HeadState::Attached { branch, oid } => (Some(branch), oid),
            HeadState::Detached(oid) => (None, Some(oid)),
        };

        let head_tree = match &head_oid {
            Some(oid) => database.commit_tree_flat(oid)?,
            None => BTreeMap::new(),
        };

        let mut staged = BTreeMap::new();
        let mut unstaged = BTreeMap::new();

        let entries = index.entries().cloned().collect::<Vec<_>>();
        for entry in &entries {
            if let Some(change) = Self::check_against_worktree(workspace, index, entry)? {
                unstaged.insert(entry.path.clone(), change);
            }
            if let Some(change) = Self::check_against_head(&head_tree, entry) {
                staged.insert(entry.path.clone(), change);
            }
        }
        for path in head_tree.keys() {
            if !index.contains(path) {
                staged.insert(path.clone(), StagedChange::Deleted);
            }
        }

        let untracked = workspace
            .list_files(ignore)?
            .into_iter()
            .filter(|path| !index.contains(path))
            .collect::<BTreeSet<_>>();

        Ok(StatusReport {
            branch,
            head_oid,
            staged,
            unstaged,
            untracked,
            head_tree,
        })
    }

    fn check_against_worktree(
        workspace: &Workspace,
        index: &mut Index,
        entry: &IndexEntry,
    ) -> anyhow::Result<Option<WorktreeChange>> {
        let stat = match workspace.stat_file(&entry.path)? {
            Some(stat) if !stat.mode.is_tree() => stat,
            // gone, or a directory now stands where the file was
            _ => return Ok(Some(WorktreeChange::Deleted)),
        };

        if entry.stat_match(&stat) && entry.times_match(&stat) {
            return Ok(None);
        }

        let blob = workspace.parse_blob(&entry.path)?;
        if blob.object_id()? != entry.oid || stat.mode != entry.metadata.mode {
            return Ok(Some(WorktreeChange::Modified));
        }

        // content is unchanged; remember the new stat so the next scan can
        // skip the hash
        index.update_entry_stat(&entry.path, stat);
        Ok(None)
    }

    fn check_against_head(
        head_tree: &BTreeMap<String, DatabaseEntry>,
        entry: &IndexEntry,
    ) -> Option<StagedChange> {
        match head_tree.get(&entry.path) {
            None => Some(StagedChange::Added),
            Some(head_entry)
                if head_entry.oid != entry.oid || head_entry.mode != entry.metadata.mode =>
            {
                Some(StagedChange::Modified)
            }
            Some(_) => None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }

    /// True when the path differs from HEAD in either the index or the
    /// worktree; checkout uses this to spot changes it would destroy.
    pub fn touches(&self, path: &str) -> bool {
        self.staged.contains_key(path)
            || self.unstaged.contains_key(path)
            || self.untracked.contains(path)
    }
}
