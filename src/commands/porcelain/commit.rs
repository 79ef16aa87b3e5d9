use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use std::io::Write;

impl Repository {
    pub fn commit(&mut self, message: Option<String>, amend: bool) -> anyhow::Result<()> {
        self.index_mut().load()?;
        if self.index().is_empty() {
            return Err(anyhow::anyhow!("cannot commit: index is empty"));
        }

        let tree_oid = self.write_tree_from_index()?;
        let head_oid = self.refs().read_head()?;

        let (parents, author, message) = if amend {
            let head_oid = head_oid
                .ok_or_else(|| anyhow::anyhow!("cannot amend: HEAD does not point to a commit"))?;
            let old = self
                .database()
                .parse_object_as_commit(&head_oid)?
                .ok_or_else(|| anyhow::anyhow!("HEAD does not point to a commit"))?;

            // the amended commit replaces the tip: same parents, same
            // author, fresh committer; message reused unless given
            let message = message.unwrap_or_else(|| old.message().to_string());
            (old.parents().to_vec(), old.author().clone(), message)
        } else {
            let message =
                message.ok_or_else(|| anyhow::anyhow!("commit message is required (use -m)"))?;
            (
                head_oid.into_iter().collect(),
                Author::author_from_env(),
                message,
            )
        };

        let commit = Commit::new(
            parents,
            tree_oid,
            author,
            Author::committer_from_env(),
            message,
        );
        let commit_oid = self.database().store(&commit)?;
        self.refs().update_head(&commit_oid)?;

        let action = if amend { "amended" } else { "committed to" };
        match self.refs().current_branch()? {
            Some(branch) => writeln!(self.writer(), "{action} {branch}: {commit_oid}")?,
            None => {
                let action = if amend { "amended" } else { "committed" };
                writeln!(self.writer(), "{action} in detached HEAD: {commit_oid}")?;
            }
        }

        Ok(())
    }
}
