//! Revision resolver: user strings to commit ids.
//!
//! Accepted forms, tried in order: `HEAD`, full `refs/...` paths, branch
//! names, full 40-hex ids, unique hex prefixes of at least four chars.

use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RitError;
use derive_new::new;

#[derive(new)]
pub struct Revision<'r> {
    database: &'r Database,
    refs: &'r Refs,
}

impl<'r> Revision<'r> {
    pub fn resolve(&self, rev: &str) -> anyhow::Result<ObjectId> {
        if rev == "HEAD" {
            return self
                .refs
                .read_head()?
                .ok_or_else(|| RitError::UnbornHead.into());
        }

        if rev.starts_with("refs/") {
            if let Some(oid) = self.refs.read_ref_path(rev)? {
                return Ok(oid);
            }
            return Err(RitError::RefNotFound(rev.to_string()).into());
        }

        if let Ok(branch) = BranchName::try_parse(rev) {
            if let Some(oid) = self.refs.read_branch(&branch)? {
                return Ok(oid);
            }
        }

        let is_hex = rev.chars().all(|c| c.is_ascii_hexdigit());
        if is_hex && rev.len() >= 4 {
            return self.database.resolve_prefix(rev);
        }

        Err(RitError::RefNotFound(rev.to_string()).into())
    }

    /// Resolve and insist the result is a commit.
    pub fn resolve_commit(&self, rev: &str) -> anyhow::Result<(ObjectId, Commit)> {
        let oid = self.resolve(rev)?;
        let commit = self
            .database
            .parse_object_as_commit(&oid)?
            .ok_or_else(|| anyhow::anyhow!("revision '{rev}' does not point to a commit"))?;
        Ok((oid, commit))
    }
}
