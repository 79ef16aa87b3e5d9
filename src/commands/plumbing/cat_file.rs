use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, ObjectBox};
use std::io::Write;

/// What `cat-file` should print about the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    Pretty,
    TypeOnly,
    SizeOnly,
}

impl Repository {
    pub fn cat_file(&self, mode: CatFileMode, rev: &str) -> anyhow::Result<()> {
        let oid = self.revision().resolve(rev)?;
        let (object_type, payload) = self.database().load(&oid)?;

        match mode {
            CatFileMode::TypeOnly => {
                writeln!(self.writer(), "{object_type}")?;
            }
            CatFileMode::SizeOnly => {
                writeln!(self.writer(), "{}", payload.len())?;
            }
            CatFileMode::Pretty => match self.database().parse_object(&oid)? {
                // blobs and commits print their payload verbatim
                ObjectBox::Blob(_) | ObjectBox::Commit(_) => {
                    self.writer().write_all(&payload)?;
                }
                ObjectBox::Tree(tree) => {
                    writeln!(self.writer(), "{}", tree.display())?;
                }
            },
        }

        Ok(())
    }
}
