use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use std::collections::BTreeMap;

impl Repository {
    /// `restore --staged`: reset index entries to their HEAD tree state,
    /// leaving the working tree alone. Paths absent from HEAD are simply
    /// unstaged.
    pub fn restore_staged(&mut self, raw_paths: &[String]) -> anyhow::Result<()> {
        self.index_mut().load()?;

        let head_entries = match self.refs().read_head()? {
            Some(head_oid) => self.database().commit_tree_flat(&head_oid)?,
            None => BTreeMap::new(),
        };

        let mut targets = std::collections::BTreeSet::new();
        for raw in raw_paths {
            let spec = self.workspace().normalize_pathspec(self.cwd(), raw)?;
            targets.extend(self.index().paths_under(&spec));
            let prefix = format!("{spec}/");
            targets.extend(
                head_entries
                    .keys()
                    .filter(|path| **path == spec || path.starts_with(&prefix))
                    .cloned(),
            );
        }
        if targets.is_empty() {
            return Err(anyhow::anyhow!("pathspec did not match any staged entries"));
        }

        for path in targets {
            match head_entries.get(&path) {
                Some(entry) => self.index_mut().add(IndexEntry::from_tree_entry(
                    path.clone(),
                    entry.oid.clone(),
                    entry.mode,
                )),
                None => self.index_mut().remove(&path),
            }
        }

        self.index_mut().save()?;
        Ok(())
    }
}
