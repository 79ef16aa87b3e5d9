//! Working-tree I/O.
//!
//! All paths crossing this boundary are repo-relative strings with `/`
//! separators; the workspace owns the mapping to real filesystem paths.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::ignore::IgnoreRules;
use crate::artifacts::objects::blob::Blob;
use crate::errors::RitError;
use anyhow::Context;
use bytes::Bytes;
use is_executable::IsExecutable;
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const GIT_DIR: &str = ".git";

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn absolute(&self, rel_path: &str) -> PathBuf {
        self.path.join(rel_path)
    }

    pub fn file_exists(&self, rel_path: &str) -> bool {
        self.absolute(rel_path).is_file()
    }

    /// Raw file bytes, no normalization. Symlinks are followed and read as
    /// the files they point to.
    pub fn read_file(&self, rel_path: &str) -> anyhow::Result<Bytes> {
        let path = self.absolute(rel_path);
        let content =
            std::fs::read(&path).with_context(|| format!("unable to read {rel_path}"))?;
        Ok(Bytes::from(content))
    }

    pub fn parse_blob(&self, rel_path: &str) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(rel_path)?))
    }

    /// Stat metadata for an index entry; `None` when the file is gone.
    pub fn stat_file(&self, rel_path: &str) -> anyhow::Result<Option<EntryMetadata>> {
        let path = self.absolute(rel_path);
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(anyhow::Error::from(err)
                    .context(format!("unable to stat {rel_path}")))
            }
        };

        let mode = if metadata.is_dir() {
            EntryMode::Directory
        } else if path.is_executable() {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        };

        Ok(Some(EntryMetadata {
            ctime: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
            mtime: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
        }))
    }

    /// All non-ignored files in the working tree, sorted. Ignored
    /// directories are not descended into; `.git` never is.
    pub fn list_files(&self, ignore: &IgnoreRules) -> anyhow::Result<Vec<String>> {
        let root = self.path.to_path_buf();
        let mut files = WalkDir::new(&root)
            .into_iter()
            .filter_entry(|entry| {
                let rel = match entry.path().strip_prefix(&root) {
                    Ok(rel) if rel.as_os_str().is_empty() => return true,
                    Ok(rel) => rel,
                    Err(_) => return false,
                };
                let rel = rel.to_string_lossy().replace('\\', "/");
                if rel == GIT_DIR || rel.starts_with(".git/") {
                    return false;
                }
                !ignore.is_ignored(&rel, entry.file_type().is_dir())
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&root)
                    .ok()
                    .map(|rel| rel.to_string_lossy().replace('\\', "/"))
            })
            .collect::<Vec<_>>();
        files.sort();
        Ok(files)
    }

    /// Write a checked-out file: parents created, content replaced,
    /// permissions set from the entry mode.
    pub fn write_file(&self, rel_path: &str, data: &[u8], mode: EntryMode) -> anyhow::Result<()> {
        let path = self.absolute(rel_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("unable to create directories for {rel_path}"))?;
        }
        std::fs::write(&path, data).with_context(|| format!("unable to write {rel_path}"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(
                &path,
                std::fs::Permissions::from_mode(mode.unix_permissions()),
            )
            .with_context(|| format!("unable to set permissions on {rel_path}"))?;
        }

        Ok(())
    }

    /// Delete a file and prune any directories the deletion emptied.
    pub fn remove_file(&self, rel_path: &str) -> anyhow::Result<()> {
        let path = self.absolute(rel_path);
        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("unable to remove {rel_path}"))?;
        }

        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir == self.path.as_ref() {
                break;
            }
            match std::fs::remove_dir(dir) {
                Ok(()) => parent = dir.parent(),
                Err(_) => break, // not empty or already gone
            }
        }

        Ok(())
    }

    /// Resolve a user-supplied path argument against the current directory
    /// and re-express it relative to the repository root.
    pub fn normalize_pathspec(&self, cwd: &Path, raw: &str) -> anyhow::Result<String> {
        let joined = if Path::new(raw).is_absolute() {
            PathBuf::from(raw)
        } else {
            cwd.join(raw)
        };

        // lexical normalization: resolve `.` and `..` without touching disk
        let mut normalized = PathBuf::new();
        for component in joined.components() {
            match component {
                std::path::Component::CurDir => {}
                std::path::Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(RitError::PathOutsideRepo(raw.to_string()).into());
                    }
                }
                other => normalized.push(other),
            }
        }

        let rel = normalized
            .strip_prefix(self.path.as_ref())
            .map_err(|_| RitError::PathOutsideRepo(raw.to_string()))?;
        Ok(rel.to_string_lossy().replace('\\', "/"))
    }

    /// Every file under the root except `.git`, ignore rules not applied.
    /// `add` wants this raw view: ignore filtering there depends on whether
    /// a path is already tracked.
    fn all_files_under(&self, rel_prefix: &str) -> anyhow::Result<Vec<String>> {
        let root = self.path.to_path_buf();
        let start = if rel_prefix.is_empty() {
            root.clone()
        } else {
            self.absolute(rel_prefix)
        };

        let mut files = WalkDir::new(&start)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != std::ffi::OsStr::new(GIT_DIR))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&root)
                    .ok()
                    .map(|rel| rel.to_string_lossy().replace('\\', "/"))
            })
            .collect::<Vec<_>>();
        files.sort();
        Ok(files)
    }

    /// Expand path arguments for `add`: directories recurse to the files
    /// beneath them, files stay as given. Returns `(rel_path, explicit)`
    /// pairs, `explicit` marking paths the user named directly.
    pub fn expand_paths(
        &self,
        cwd: &Path,
        raw_paths: &[String],
    ) -> anyhow::Result<Vec<(String, bool)>> {
        let mut expanded = Vec::new();

        for raw in raw_paths {
            let rel = self.normalize_pathspec(cwd, raw)?;
            let absolute = self.absolute(&rel);

            if !absolute.exists() {
                return Err(anyhow::anyhow!("pathspec '{raw}' did not match any files"));
            }

            if absolute.is_dir() {
                for file in self.all_files_under(&rel)? {
                    expanded.push((file, false));
                }
            } else {
                if rel.starts_with(".git/") || rel == GIT_DIR {
                    continue;
                }
                expanded.push((rel, true));
            }
        }

        expanded.sort();
        expanded.dedup_by(|a, b| a.0 == b.0);
        Ok(expanded)
    }
}
