use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn ls_files(&mut self, stage: bool) -> anyhow::Result<()> {
        self.index_mut().load()?;

        for entry in self.index().entries() {
            if stage {
                writeln!(
                    self.writer(),
                    "{} {} 0\t{}",
                    entry.metadata.mode.as_str(),
                    entry.oid,
                    entry.path
                )?;
            } else {
                writeln!(self.writer(), "{}", entry.path)?;
            }
        }

        Ok(())
    }
}
