//! Error kinds shared across the repository areas and commands.
//!
//! Commands propagate these through `anyhow::Result`; the CLI boundary in
//! `main.rs` formats them as `error: <message>` on stderr and exits non-zero.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RitError {
    #[error("not a git repository (or any of the parent directories)")]
    NotARepository,

    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: String, reason: String },

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error("corrupt ref {name}: {reason}")]
    CorruptRef { name: String, reason: String },

    #[error("object prefix {0} is ambiguous")]
    AmbiguousPrefix(String),

    #[error("object {0} not found")]
    ObjectNotFound(String),

    #[error("unknown revision '{0}'")]
    RefNotFound(String),

    #[error("current branch does not have any commits yet")]
    UnbornHead,

    #[error("invalid ref name '{0}'")]
    InvalidRefName(String),

    #[error("cannot {operation} with local changes; commit or clean your working tree first")]
    DirtyWorktree { operation: &'static str },

    #[error("path '{0}' is outside the repository")]
    PathOutsideRepo(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}
