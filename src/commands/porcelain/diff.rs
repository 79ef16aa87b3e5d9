use crate::areas::repository::Repository;
use crate::artifacts::diff::diff_algorithm::{Hunk, MyersDiff};
use crate::artifacts::diff::diff_target::DiffTarget;
use crate::artifacts::status::status_report::WorktreeChange;
use colored::Colorize;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Unstaged diff: index blob against the working tree, one file at a
    /// time, in git's unified format.
    pub fn diff(&mut self) -> anyhow::Result<()> {
        let report = self.status_report()?;

        for (path, change) in &report.unstaged {
            let a = DiffTarget::from_index(path, self.index(), self.database())?;
            let b = match change {
                WorktreeChange::Modified => DiffTarget::from_file(path, self.workspace())?,
                WorktreeChange::Deleted => DiffTarget::from_nothing(path),
            };
            self.print_diff(a, b)?;
        }

        Ok(())
    }

    fn print_diff(&self, mut a: DiffTarget, mut b: DiffTarget) -> anyhow::Result<()> {
        if a.oid == b.oid && a.mode == b.mode {
            return Ok(());
        }

        a.file = Path::new("a").join(&a.file);
        b.file = Path::new("b").join(&b.file);

        writeln!(
            self.writer(),
            "{}",
            format!("diff --git {} {}", a.file.display(), b.file.display()).bold()
        )?;
        self.print_diff_mode(&a, &b)?;
        self.print_diff_content(&a, &b)?;

        Ok(())
    }

    fn print_diff_mode(&self, a: &DiffTarget, b: &DiffTarget) -> anyhow::Result<()> {
        if a.mode.is_none() {
            writeln!(
                self.writer(),
                "{}",
                format!("new file mode {}", b.pretty_mode()).bold()
            )?;
        } else if b.mode.is_none() {
            writeln!(
                self.writer(),
                "{}",
                format!("deleted file mode {}", a.pretty_mode()).bold()
            )?;
        } else if a.mode != b.mode {
            writeln!(self.writer(), "{}", format!("old mode {}", a.pretty_mode()).bold())?;
            writeln!(self.writer(), "{}", format!("new mode {}", b.pretty_mode()).bold())?;
        }

        Ok(())
    }

    fn print_diff_content(&self, a: &DiffTarget, b: &DiffTarget) -> anyhow::Result<()> {
        if a.oid == b.oid {
            return Ok(());
        }

        let mut oid_range = format!(
            "index {}..{}",
            a.oid.to_short_oid(),
            b.oid.to_short_oid()
        );
        if a.mode == b.mode {
            oid_range.push_str(&format!(" {}", a.pretty_mode()));
        }

        writeln!(self.writer(), "{}", oid_range.bold())?;
        writeln!(
            self.writer(),
            "{}",
            format!("--- {}", a.diff_path().display()).bold()
        )?;
        writeln!(
            self.writer(),
            "{}",
            format!("+++ {}", b.diff_path().display()).bold()
        )?;

        for hunk in MyersDiff::new(&a.data, &b.data).hunks() {
            self.print_diff_hunk(&hunk)?;
        }

        Ok(())
    }

    fn print_diff_hunk(&self, hunk: &Hunk<String>) -> anyhow::Result<()> {
        let a_offset = format!("{},{}", hunk.a_start(), hunk.a_size());
        let b_offset = format!("{},{}", hunk.b_start(), hunk.b_size());

        writeln!(
            self.writer(),
            "{}",
            format!("@@ -{a_offset} +{b_offset} @@").cyan()
        )?;

        for edit in hunk.edits() {
            writeln!(self.writer(), "{edit}")?;
        }

        Ok(())
    }
}
