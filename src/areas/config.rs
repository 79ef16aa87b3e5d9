//! `.git/config`: a small INI reader/writer and the remote table on top.
//!
//! Sections keep their order and unknown keys survive a rewrite, so a
//! config touched by Git stays intact. Remotes live in sections named
//! `remote "<name>"` with a `url` key.

use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config";
const REMOTE_SECTION_PREFIX: &str = "remote \"";

#[derive(Debug, Clone)]
struct Section {
    /// Raw section header between the brackets, e.g. `core` or
    /// `remote "origin"`
    name: String,
    entries: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct Config {
    path: PathBuf,
    sections: Vec<Section>,
}

impl Config {
    pub fn load(git_dir: &Path) -> anyhow::Result<Self> {
        let path = git_dir.join(CONFIG_FILE);
        let mut sections = Vec::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("unable to read {}", path.display()))?;
            let mut current: Option<Section> = None;

            for line in content.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                    continue;
                }

                if let Some(header) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                    if let Some(section) = current.take() {
                        sections.push(section);
                    }
                    current = Some(Section {
                        name: header.trim().to_string(),
                        entries: Vec::new(),
                    });
                } else if let Some((key, value)) = trimmed.split_once('=') {
                    if let Some(section) = current.as_mut() {
                        section
                            .entries
                            .push((key.trim().to_string(), value.trim().to_string()));
                    }
                }
            }
            if let Some(section) = current {
                sections.push(section);
            }
        }

        Ok(Config { path, sections })
    }

    /// Rewrite the whole file atomically.
    pub fn save(&self) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .context("config path has no parent directory")?;
        let temp = tempfile::NamedTempFile::new_in(parent)
            .context("unable to create temporary config file")?;

        let mut out = String::new();
        for section in &self.sections {
            out.push_str(&format!("[{}]\n", section.name));
            for (key, value) in &section.entries {
                out.push_str(&format!("\t{key} = {value}\n"));
            }
        }

        temp.as_file().write_all(out.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .with_context(|| format!("unable to persist {}", self.path.display()))?;
        Ok(())
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == section)
            .and_then(|s| {
                s.entries
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.as_str())
            })
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let section = match self.sections.iter_mut().find(|s| s.name == section) {
            Some(section) => section,
            None => {
                self.sections.push(Section {
                    name: section.to_string(),
                    entries: Vec::new(),
                });
                self.sections.last_mut().expect("just pushed")
            }
        };

        match section.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => section.entries.push((key.to_string(), value.to_string())),
        }
    }

    fn remove_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != name);
        before != self.sections.len()
    }

    fn remote_section(name: &str) -> String {
        format!("{REMOTE_SECTION_PREFIX}{name}\"")
    }

    /// `(name, url)` pairs of all configured remotes, sorted by name.
    pub fn remotes(&self) -> Vec<(String, String)> {
        let mut remotes = self
            .sections
            .iter()
            .filter_map(|section| {
                let name = section
                    .name
                    .strip_prefix(REMOTE_SECTION_PREFIX)?
                    .strip_suffix('"')?;
                let url = section
                    .entries
                    .iter()
                    .find(|(k, _)| k == "url")
                    .map(|(_, v)| v.clone())?;
                if url.is_empty() {
                    return None;
                }
                Some((name.to_string(), url))
            })
            .collect::<Vec<_>>();
        remotes.sort();
        remotes
    }

    pub fn remote_url(&self, name: &str) -> anyhow::Result<String> {
        self.get(&Self::remote_section(name), "url")
            .filter(|url| !url.is_empty())
            .map(|url| url.to_string())
            .ok_or_else(|| anyhow::anyhow!("remote '{name}' does not exist"))
    }

    pub fn add_remote(&mut self, name: &str, url: &str) -> anyhow::Result<()> {
        let section = Self::remote_section(name);
        if self.sections.iter().any(|s| s.name == section) {
            return Err(anyhow::anyhow!("remote '{name}' already exists"));
        }
        self.set(&section, "url", url);
        self.save()
    }

    pub fn remove_remote(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.remove_section(&Self::remote_section(name)) {
            return Err(anyhow::anyhow!("remote '{name}' does not exist"));
        }
        self.save()
    }

    /// Seed the `[core]` section written by `init`.
    pub fn init_defaults(&mut self) -> anyhow::Result<()> {
        self.set("core", "repositoryformatversion", "0");
        self.set("core", "filemode", "true");
        self.set("core", "bare", "false");
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_in(dir: &Path) -> Config {
        Config::load(dir).unwrap()
    }

    #[test]
    fn add_list_get_remove_remotes() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = config_in(dir.path());

        config
            .add_remote("origin", "http://example.com/repo.git")
            .unwrap();
        config
            .add_remote("backup", "http://backup.example.com/repo.git")
            .unwrap();

        let reloaded = config_in(dir.path());
        assert_eq!(
            reloaded.remotes(),
            vec![
                (
                    "backup".to_string(),
                    "http://backup.example.com/repo.git".to_string()
                ),
                (
                    "origin".to_string(),
                    "http://example.com/repo.git".to_string()
                ),
            ]
        );
        assert_eq!(
            reloaded.remote_url("origin").unwrap(),
            "http://example.com/repo.git"
        );

        let mut reloaded = reloaded;
        assert!(reloaded.add_remote("origin", "elsewhere").is_err());
        reloaded.remove_remote("backup").unwrap();
        assert!(reloaded.remote_url("backup").is_err());
    }

    #[test]
    fn unknown_sections_survive_a_rewrite() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config"),
            "[core]\n\tbare = false\n[user]\n\tname = Someone\n",
        )
        .unwrap();

        let mut config = config_in(dir.path());
        config.add_remote("origin", "http://example.com").unwrap();

        let reloaded = config_in(dir.path());
        assert_eq!(reloaded.get("user", "name"), Some("Someone"));
        assert_eq!(reloaded.get("core", "bare"), Some("false"));
    }

    #[test]
    fn init_defaults_seed_core() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = config_in(dir.path());
        config.init_defaults().unwrap();

        let reloaded = config_in(dir.path());
        assert_eq!(reloaded.get("core", "repositoryformatversion"), Some("0"));
    }
}
