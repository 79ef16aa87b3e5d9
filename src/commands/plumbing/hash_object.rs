use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{frame, hash_object};
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::io::Write;

impl Repository {
    pub fn hash_object(
        &self,
        file: &str,
        object_type: ObjectType,
        write: bool,
    ) -> anyhow::Result<()> {
        let path = if std::path::Path::new(file).is_absolute() {
            std::path::PathBuf::from(file)
        } else {
            self.cwd().join(file)
        };
        let data =
            std::fs::read(&path).with_context(|| format!("unable to read '{file}'"))?;

        let oid = if write {
            self.database().store_framed(&frame(object_type, &data))?
        } else {
            hash_object(object_type, &data)
        };

        writeln!(self.writer(), "{oid}")?;
        Ok(())
    }
}
