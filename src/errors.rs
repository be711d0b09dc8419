//! Named repository failures
//!
//! Low-level stores return these inside `anyhow::Error` so callers can keep using `?`
//! while the binary still maps the first failure to a stable exit status.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("not a sprig repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("object {0} not found")]
    ObjectNotFound(String),

    #[error("file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// Reserved: no size limit is enforced yet.
    #[error("file {} is too large ({size} bytes)", .path.display())]
    FileTooLarge { path: PathBuf, size: u64 },

    #[error("branch {0} already exists")]
    BranchExists(String),

    #[error("branch {0} does not exist")]
    BranchNotFound(String),

    #[error("cannot merge with a detached HEAD")]
    DetachedHeadMergeRefused,

    #[error("object {0} is not a tree")]
    InvalidTreeReference(String),

    #[error("index is corrupt: {0}")]
    IndexCorrupt(String),
}

impl RepositoryError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RepositoryError::AlreadyInitialized(_) => 2,
            RepositoryError::NotARepository(_) => 3,
            RepositoryError::ObjectNotFound(_) => 4,
            RepositoryError::FileNotFound(_) => 5,
            RepositoryError::FileTooLarge { .. } => 6,
            RepositoryError::BranchExists(_) => 7,
            RepositoryError::BranchNotFound(_) => 8,
            RepositoryError::DetachedHeadMergeRefused => 9,
            RepositoryError::InvalidTreeReference(_) => 10,
            RepositoryError::IndexCorrupt(_) => 11,
        }
    }
}

/// Exit status for an arbitrary error: the taxonomy code when the root cause is a
/// `RepositoryError`, 1 otherwise.
pub fn exit_code_for(error: &anyhow::Error) -> u8 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<RepositoryError>())
        .map(RepositoryError::exit_code)
        .unwrap_or(1)
}
