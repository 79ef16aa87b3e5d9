//! Repository facade.
//!
//! Owns the repo root and the opened areas (database, index, workspace,
//! refs) and is the receiver for every command implementation. There is no
//! global "current repository": callers construct one from a path and
//! pass it around explicitly.

use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::ignore::IgnoreRules;
use crate::artifacts::status::status_report::StatusReport;
use crate::errors::RitError;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

pub const GIT_DIR: &str = ".git";

const DATABASE_DIR: &str = "objects";
const INDEX_FILE: &str = "index";

pub struct Repository {
    /// Canonical repository root
    path: Box<Path>,
    /// Directory the command was invoked from, for relative path args
    cwd: PathBuf,
    /// Output sink (stdout in production, a buffer in tests)
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Index,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open the repository rooted exactly at `path`.
    pub fn open(path: PathBuf, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path.canonicalize()?;
        let cwd = std::env::current_dir()?.canonicalize()?;
        Self::open_with_cwd(path, cwd, writer)
    }

    fn open_with_cwd(
        path: PathBuf,
        cwd: PathBuf,
        writer: Box<dyn std::io::Write>,
    ) -> anyhow::Result<Self> {
        let git_dir = path.join(GIT_DIR);

        let index = Index::new(git_dir.join(INDEX_FILE).into_boxed_path());
        let database = Database::new(git_dir.join(DATABASE_DIR).into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(git_dir.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            cwd,
            writer: RefCell::new(writer),
            index,
            database,
            workspace,
            refs,
        })
    }

    /// Find the repository containing `start` by ascending until a `.git`
    /// directory appears.
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let start = start.canonicalize().map_err(|_| RitError::NotARepository)?;

        let mut candidate = Some(start.as_path());
        while let Some(dir) = candidate {
            if dir.join(GIT_DIR).is_dir() {
                return Self::open_with_cwd(dir.to_path_buf(), start.clone(), writer);
            }
            candidate = dir.parent();
        }

        Err(RitError::NotARepository.into())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_dir(&self) -> PathBuf {
        self.path.join(GIT_DIR)
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut Index {
        &mut self.index
    }

    pub fn revision(&self) -> Revision<'_> {
        Revision::new(&self.database, &self.refs)
    }

    pub fn config(&self) -> anyhow::Result<Config> {
        Config::load(&self.git_dir())
    }

    pub fn ignore_rules(&self) -> anyhow::Result<IgnoreRules> {
        IgnoreRules::load(&self.path)
    }

    /// Load the index and run the full tri-state scan; stat-cache refreshes
    /// discovered along the way are written back.
    pub fn status_report(&mut self) -> anyhow::Result<StatusReport> {
        self.index.load()?;
        let ignore = IgnoreRules::load(&self.path)?;
        let report = StatusReport::scan(
            &self.workspace,
            &self.database,
            &self.refs,
            &mut self.index,
            &ignore,
        )?;
        if self.index.has_changed() {
            self.index.save()?;
        }
        Ok(report)
    }
}
