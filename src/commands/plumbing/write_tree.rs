use crate::areas::repository::Repository;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::tree::Tree;
use std::io::Write;

impl Repository {
    pub fn write_tree(&mut self) -> anyhow::Result<()> {
        self.index_mut().load()?;
        let tree_oid = self.write_tree_from_index()?;
        writeln!(self.writer(), "{tree_oid}")?;
        Ok(())
    }

    /// Fold the loaded index into tree objects, store them children-first,
    /// and return the root id. An empty index produces the empty tree.
    pub(crate) fn write_tree_from_index(
        &self,
    ) -> anyhow::Result<crate::artifacts::objects::object_id::ObjectId> {
        let tree = Tree::build(self.index().entries().map(|entry| {
            (
                entry.path.as_str(),
                DatabaseEntry::new(entry.oid.clone(), entry.metadata.mode),
            )
        }))?;

        tree.traverse(&|subtree| self.database().store(subtree).map(|_| ()))?;
        tree.object_id()
    }
}
