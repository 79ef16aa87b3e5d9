use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use std::io::Write;

impl Repository {
    pub fn branch(&self, name: Option<&str>) -> anyhow::Result<()> {
        let name = match name {
            Some(name) => name,
            None => return self.list_branches(),
        };

        let branch = BranchName::try_parse(name)?;
        let head_oid = self.refs().read_head()?.ok_or_else(|| {
            anyhow::anyhow!("cannot create branch: HEAD does not point to a commit")
        })?;

        self.refs().create_branch(&branch, &head_oid)?;
        writeln!(
            self.writer(),
            "branch '{branch}' created at {}",
            head_oid.to_short_oid()
        )?;
        Ok(())
    }

    fn list_branches(&self) -> anyhow::Result<()> {
        let current = self.refs().current_branch()?;

        for branch in self.refs().list_branches()? {
            let marker = match &current {
                Some(current) if current.as_ref() == branch => "*",
                _ => " ",
            };
            writeln!(self.writer(), "{marker} {branch}")?;
        }

        Ok(())
    }
}
