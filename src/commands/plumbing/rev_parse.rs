use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn rev_parse(&self, rev: &str) -> anyhow::Result<()> {
        let oid = self.revision().resolve(rev)?;
        writeln!(self.writer(), "{oid}")?;
        Ok(())
    }
}
