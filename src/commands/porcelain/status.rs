use crate::areas::repository::Repository;
use crate::artifacts::status::status_report::WorktreeChange;
use std::io::Write;

impl Repository {
    pub fn status(&mut self) -> anyhow::Result<()> {
        let report = self.status_report()?;

        match (&report.branch, &report.head_oid) {
            (Some(branch), _) => writeln!(self.writer(), "On branch {branch}")?,
            (None, Some(oid)) => {
                writeln!(self.writer(), "HEAD detached at {}", oid.to_short_oid())?
            }
            (None, None) => writeln!(self.writer(), "HEAD detached at unknown")?,
        }
        writeln!(self.writer())?;

        if !report.staged.is_empty() {
            writeln!(self.writer(), "Changes to be committed:")?;
            for path in report.staged.keys() {
                writeln!(self.writer(), "  staged:   {path}")?;
            }
            writeln!(self.writer())?;
        }

        if !report.unstaged.is_empty() {
            writeln!(self.writer(), "Changes not staged for commit:")?;
            for (path, change) in &report.unstaged {
                if *change == WorktreeChange::Modified {
                    writeln!(self.writer(), "  modified: {path}")?;
                }
            }
            for (path, change) in &report.unstaged {
                if *change == WorktreeChange::Deleted {
                    writeln!(self.writer(), "  deleted:  {path}")?;
                }
            }
            writeln!(self.writer())?;
        }

        if !report.untracked.is_empty() {
            writeln!(self.writer(), "Untracked files:")?;
            for path in &report.untracked {
                writeln!(self.writer(), "  {path}")?;
            }
            writeln!(self.writer())?;
        }

        if report.is_clean() {
            writeln!(self.writer(), "nothing to commit, working tree clean")?;
        }

        Ok(())
    }
}
