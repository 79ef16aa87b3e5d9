use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn remote_list(&self, verbose: bool) -> anyhow::Result<()> {
        for (name, url) in self.config()?.remotes() {
            if verbose {
                writeln!(self.writer(), "{name}\t{url} (fetch)")?;
                writeln!(self.writer(), "{name}\t{url} (push)")?;
            } else {
                writeln!(self.writer(), "{name}")?;
            }
        }
        Ok(())
    }

    pub fn remote_add(&self, name: &str, url: &str) -> anyhow::Result<()> {
        self.config()?.add_remote(name, url)
    }

    pub fn remote_remove(&self, name: &str) -> anyhow::Result<()> {
        self.config()?.remove_remote(name)
    }

    pub fn remote_get_url(&self, name: &str) -> anyhow::Result<()> {
        writeln!(self.writer(), "{}", self.config()?.remote_url(name)?)?;
        Ok(())
    }
}
