use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use std::io::Write;

/// How much state `reset` rewinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Move HEAD only
    Soft,
    /// Move HEAD and rebuild the index from the target tree
    Mixed,
}

impl ResetMode {
    fn as_str(&self) -> &'static str {
        match self {
            ResetMode::Soft => "soft",
            ResetMode::Mixed => "mixed",
        }
    }
}

impl Repository {
    pub fn reset(&mut self, mode: ResetMode, rev: &str) -> anyhow::Result<()> {
        let (target_oid, _) = self.revision().resolve_commit(rev)?;

        self.refs().update_head(&target_oid)?;

        if mode == ResetMode::Mixed {
            let tree = self.database().commit_tree_flat(&target_oid)?;
            let entries = tree.into_iter().map(|(path, entry)| {
                IndexEntry::from_tree_entry(path, entry.oid, entry.mode)
            });
            self.index_mut().replace(entries);
            self.index_mut().save()?;
        }

        let label = match self.refs().current_branch()? {
            Some(branch) => branch.to_string(),
            None => "HEAD".to_string(),
        };
        writeln!(
            self.writer(),
            "reset {label} to {} ({})",
            target_oid.to_short_oid(),
            mode.as_str()
        )?;

        Ok(())
    }
}
