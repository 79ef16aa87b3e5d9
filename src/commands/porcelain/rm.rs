use crate::areas::repository::Repository;

impl Repository {
    /// Remove tracked files from the index and the working tree. A file
    /// with staged or unstaged changes is not removed.
    pub fn rm(&mut self, raw_paths: &[String]) -> anyhow::Result<()> {
        let report = self.status_report()?;
        if self.index().is_empty() {
            return Err(anyhow::anyhow!("nothing to remove: index is empty"));
        }

        let mut matched = std::collections::BTreeSet::new();
        for raw in raw_paths {
            let spec = self.workspace().normalize_pathspec(self.cwd(), raw)?;
            matched.extend(self.index().paths_under(&spec));
        }
        if matched.is_empty() {
            return Err(anyhow::anyhow!("pathspec did not match any tracked files"));
        }

        for path in &matched {
            if report.staged.contains_key(path) || report.unstaged.contains_key(path) {
                return Err(anyhow::anyhow!(
                    "'{path}' has local modifications; commit them or restore the file first"
                ));
            }
        }

        for path in &matched {
            self.index_mut().remove(path);
            self.workspace().remove_file(path)?;
        }
        self.index_mut().save()?;

        Ok(())
    }
}
