use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        let git_dir = self.git_dir();
        if git_dir.exists() {
            return Err(anyhow::anyhow!(
                "repository already exists at {}",
                self.path().display()
            ));
        }

        fs::create_dir_all(self.database().objects_path())
            .context("failed to create the objects directory")?;
        fs::create_dir_all(self.refs().heads_path())
            .context("failed to create the refs directory")?;
        fs::write(self.refs().head_path(), "ref: refs/heads/master\n")
            .context("failed to write HEAD")?;

        let mut config = self.config()?;
        config.init_defaults()?;

        writeln!(
            self.writer(),
            "initialized empty repository: {}",
            self.path().display()
        )?;
        Ok(())
    }
}
