use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::Object;
use crate::errors::RitError;
use std::collections::BTreeSet;
use std::io::Write;

impl Repository {
    /// Switch to a branch or detach at a revision.
    ///
    /// The working tree and index are rewritten to the target tree, but
    /// only paths that actually differ between HEAD and the target are
    /// touched; local changes on any of those paths abort the switch
    /// before anything is mutated.
    pub fn checkout(&mut self, target: &str) -> anyhow::Result<()> {
        let report = self.status_report()?;

        // a branch name wins over a raw revision
        let named_branch = match BranchName::try_parse(target) {
            Ok(candidate) => self
                .refs()
                .read_branch(&candidate)?
                .map(|oid| (candidate, oid)),
            Err(_) => None,
        };
        let (branch, target_oid) = match named_branch {
            Some((branch, oid)) => (Some(branch), oid),
            None => (None, self.revision().resolve_commit(target)?.0),
        };

        let target_tree = self.database().commit_tree_flat(&target_oid)?;

        // the paths this checkout would rewrite
        let touched = report
            .head_tree
            .keys()
            .chain(target_tree.keys())
            .filter(|path| report.head_tree.get(*path) != target_tree.get(*path))
            .cloned()
            .collect::<BTreeSet<_>>();

        for path in &touched {
            if report.staged.contains_key(path) || report.unstaged.contains_key(path) {
                return Err(RitError::DirtyWorktree {
                    operation: "checkout",
                }
                .into());
            }
            if let Some(new_entry) = target_tree.get(path) {
                // an untracked file sitting where the target puts one
                if report.untracked.contains(path)
                    && self.workspace().parse_blob(path)?.object_id()? != new_entry.oid
                {
                    return Err(RitError::DirtyWorktree {
                        operation: "checkout",
                    }
                    .into());
                }
            }
        }

        for path in &touched {
            match target_tree.get(path) {
                Some(entry) => {
                    let blob = self
                        .database()
                        .parse_object_as_blob(&entry.oid)?
                        .ok_or_else(|| anyhow::anyhow!("tree entry '{path}' is not a blob"))?;
                    self.workspace().write_file(path, blob.content(), entry.mode)?;
                }
                None => self.workspace().remove_file(path)?,
            }
        }

        // the index becomes the target tree, with fresh worktree stats
        let mut entries = Vec::with_capacity(target_tree.len());
        for (path, entry) in &target_tree {
            let entry = match self.workspace().stat_file(path)? {
                Some(stat) => IndexEntry::new(path.clone(), entry.oid.clone(), stat),
                None => IndexEntry::from_tree_entry(path.clone(), entry.oid.clone(), entry.mode),
            };
            entries.push(entry);
        }
        self.index_mut().replace(entries.into_iter());
        self.index_mut().save()?;

        match branch {
            Some(branch) => {
                self.refs().set_head_attached(&branch)?;
                writeln!(self.writer(), "switched to branch '{branch}'")?;
            }
            None => {
                self.refs().set_head_detached(&target_oid)?;
                writeln!(self.writer(), "HEAD is now at {}", target_oid.to_short_oid())?;
            }
        }

        Ok(())
    }
}
