use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;

impl Repository {
    /// Stage files. Directories expand to the files beneath them; ignore
    /// rules apply to untracked files only. Naming an ignored untracked
    /// file explicitly is an error rather than a silent skip.
    pub fn add(&mut self, raw_paths: &[String]) -> anyhow::Result<()> {
        self.index_mut().load()?;
        let ignore = self.ignore_rules()?;
        let expanded = self.workspace().expand_paths(self.cwd(), raw_paths)?;

        let mut refused = Vec::new();
        for (path, explicit) in expanded {
            let tracked = self.index().contains(&path);
            if !tracked && ignore.is_ignored(&path, false) {
                if explicit {
                    refused.push(path);
                }
                continue;
            }

            let blob = self.workspace().parse_blob(&path)?;
            let oid = self.database().store(&blob)?;

            let stat = self
                .workspace()
                .stat_file(&path)?
                .ok_or_else(|| anyhow::anyhow!("'{path}' vanished while being added"))?;
            self.index_mut().add(IndexEntry::new(path, oid, stat));
        }

        if !refused.is_empty() {
            return Err(anyhow::anyhow!(
                "the following paths are ignored by your .gitignore:\n{}",
                refused.join("\n")
            ));
        }

        self.index_mut().save()?;
        Ok(())
    }
}
