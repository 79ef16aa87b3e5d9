use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// First-parent history from HEAD, newest first.
    pub fn log(&self, oneline: bool, max_count: usize) -> anyhow::Result<()> {
        let mut current = Some(self.revision().resolve("HEAD")?);
        let mut printed = 0;

        while let Some(oid) = current {
            if printed >= max_count {
                break;
            }

            let commit = self
                .database()
                .parse_object_as_commit(&oid)?
                .ok_or_else(|| anyhow::anyhow!("object {oid} is not a commit"))?;

            if oneline {
                writeln!(
                    self.writer(),
                    "{} {}",
                    oid.to_short_oid(),
                    commit.short_message()
                )?;
            } else {
                writeln!(self.writer(), "commit {oid}")?;
                writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
                writeln!(self.writer())?;
                writeln!(self.writer(), "    {}", commit.short_message())?;
                writeln!(self.writer())?;
            }

            current = commit.parent().cloned();
            printed += 1;
        }

        Ok(())
    }
}
