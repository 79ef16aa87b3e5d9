//! Refs and HEAD.
//!
//! `HEAD` holds either `ref: refs/heads/<name>\n` (attached) or a bare
//! 40-hex id (detached). Branch files under `refs/heads/` hold bare ids.
//! Every ref write goes through a temp file in the target directory and an
//! atomic rename.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RitError;
use anyhow::Context;
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;

pub const HEAD: &str = "HEAD";

const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Where HEAD points right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// On a branch; the id is absent until the first commit
    Attached {
        branch: BranchName,
        oid: Option<ObjectId>,
    },
    Detached(ObjectId),
}

#[derive(Debug)]
pub struct Refs {
    /// Path to the git directory (typically `.git`)
    path: Box<Path>,
}

impl Refs {
    pub fn new(path: Box<Path>) -> Self {
        Refs { path }
    }

    pub fn head_path(&self) -> std::path::PathBuf {
        self.path.join(HEAD)
    }

    pub fn heads_path(&self) -> std::path::PathBuf {
        self.path.join("refs").join("heads")
    }

    fn read_file(&self, path: &Path) -> anyhow::Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read ref file {}", path.display()))?;
        let content = content.trim().to_string();
        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(content))
        }
    }

    /// The symbolic target of HEAD (`refs/heads/<name>`), if attached.
    pub fn head_symref(&self) -> anyhow::Result<Option<String>> {
        let content = match self.read_file(&self.head_path())? {
            Some(content) => content,
            None => return Ok(None),
        };

        let re = regex::Regex::new(SYMREF_REGEX).context("invalid symref pattern")?;
        Ok(re
            .captures(&content)
            .map(|captures| captures[1].trim().to_string()))
    }

    /// Full HEAD state: branch (with optional tip) or detached id.
    pub fn read_head_state(&self) -> anyhow::Result<HeadState> {
        if let Some(symref) = self.head_symref()? {
            let branch_raw = symref
                .strip_prefix("refs/heads/")
                .unwrap_or(symref.as_str());
            let branch = BranchName::try_parse(branch_raw)?;
            let oid = self.read_branch(&branch)?;
            return Ok(HeadState::Attached { branch, oid });
        }

        match self.read_file(&self.head_path())? {
            Some(content) => {
                let oid = ObjectId::try_parse(content).map_err(|err| RitError::CorruptRef {
                    name: HEAD.to_string(),
                    reason: err.to_string(),
                })?;
                Ok(HeadState::Detached(oid))
            }
            None => Err(RitError::CorruptRef {
                name: HEAD.to_string(),
                reason: "missing or empty".to_string(),
            }
            .into()),
        }
    }

    /// The commit id HEAD resolves to, if any.
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        match self.read_head_state()? {
            HeadState::Attached { oid, .. } => Ok(oid),
            HeadState::Detached(oid) => Ok(Some(oid)),
        }
    }

    /// The current branch name, if HEAD is attached.
    pub fn current_branch(&self) -> anyhow::Result<Option<BranchName>> {
        match self.read_head_state()? {
            HeadState::Attached { branch, .. } => Ok(Some(branch)),
            HeadState::Detached(_) => Ok(None),
        }
    }

    pub fn read_branch(&self, branch: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let path = self.heads_path().join(branch.as_ref());
        match self.read_file(&path)? {
            Some(content) => Ok(Some(ObjectId::try_parse(content).map_err(|err| {
                RitError::CorruptRef {
                    name: branch.ref_path(),
                    reason: err.to_string(),
                }
            })?)),
            None => Ok(None),
        }
    }

    /// Read an arbitrary `refs/...` path.
    pub fn read_ref_path(&self, ref_path: &str) -> anyhow::Result<Option<ObjectId>> {
        match self.read_file(&self.path.join(ref_path))? {
            Some(content) => Ok(Some(ObjectId::try_parse(content).map_err(|err| {
                RitError::CorruptRef {
                    name: ref_path.to_string(),
                    reason: err.to_string(),
                }
            })?)),
            None => Ok(None),
        }
    }

    /// Move the current position to a new commit: through the attached
    /// branch, or by rewriting a detached HEAD.
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        match self.head_symref()? {
            Some(symref) => {
                let target = self.path.join(&symref);
                self.write_ref_file(&target, &format!("{oid}\n"))
            }
            None => self.write_ref_file(&self.head_path(), &format!("{oid}\n")),
        }
    }

    /// Attach HEAD to a branch (checkout of a branch).
    pub fn set_head_attached(&self, branch: &BranchName) -> anyhow::Result<()> {
        self.write_ref_file(
            &self.head_path(),
            &format!("ref: {}\n", branch.ref_path()),
        )
    }

    /// Detach HEAD at a commit (checkout of a revision).
    pub fn set_head_detached(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&self.head_path(), &format!("{oid}\n"))
    }

    pub fn create_branch(&self, branch: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        let path = self.heads_path().join(branch.as_ref());
        if path.exists() {
            return Err(anyhow::anyhow!("branch '{branch}' already exists"));
        }
        self.write_ref_file(&path, &format!("{oid}\n"))
    }

    /// Branch names under `refs/heads/`, sorted.
    pub fn list_branches(&self) -> anyhow::Result<Vec<String>> {
        let heads = self.heads_path();
        if !heads.exists() {
            return Ok(Vec::new());
        }

        let mut branches = WalkDir::new(&heads)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&heads)
                    .ok()
                    .map(|relative| relative.to_string_lossy().replace('\\', "/"))
            })
            .collect::<Vec<_>>();
        branches.sort();
        Ok(branches)
    }

    /// Temp-file-in-same-dir, fsync, rename.
    fn write_ref_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .with_context(|| format!("ref path {} has no parent", path.display()))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("unable to create ref directory {}", parent.display()))?;

        let temp = tempfile::NamedTempFile::new_in(parent)
            .context("unable to create temporary ref file")?;
        temp.as_file().write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path)
            .with_context(|| format!("unable to persist ref file {}", path.display()))?;

        Ok(())
    }
}
