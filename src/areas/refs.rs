//! Branch refs and HEAD
//!
//! ## File Format
//!
//! - `refs/heads/<name>` holds a commit id, or nothing for a branch without commits
//! - `HEAD` holds either `ref: refs/heads/<name>` (attached) or a commit id (detached)
//!
//! Every update is a whole-file rewrite; there is no locking.

use crate::artifacts::branch::DEFAULT_BRANCH;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use derive_new::new;
use std::path::Path;

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// The control directory (`.sprig`)
    path: Box<Path>,
}

impl Refs {
    /// Create `refs/heads/`, an empty default branch and an attached HEAD
    pub fn init(&self) -> anyhow::Result<()> {
        let default_branch = BranchName::try_parse(DEFAULT_BRANCH)?;

        std::fs::create_dir_all(self.heads_path())
            .with_context(|| format!("failed to create {:?}", self.heads_path()))?;
        self.update_ref_file(self.branch_path(&default_branch), String::new())?;
        self.write_head(&Head::Attached(default_branch))
    }

    pub fn read_head(&self) -> anyhow::Result<Head> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;

        Head::parse(&content)
    }

    pub fn write_head(&self, head: &Head) -> anyhow::Result<()> {
        tracing::debug!(head = head.to_content(), "updating HEAD");
        self.update_ref_file(self.head_path(), head.to_content())
    }

    /// The commit HEAD currently stands on, if any
    pub fn resolve_head(&self) -> anyhow::Result<Option<ObjectId>> {
        match self.read_head()? {
            Head::Attached(branch) => self.read_branch(&branch),
            Head::Detached(oid) => Ok(Some(oid)),
        }
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    /// Tip of a branch; `None` when the branch exists but has no commits yet
    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(name);
        if !branch_path.is_file() {
            return Err(RepositoryError::BranchNotFound(name.to_string()).into());
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read ref file at {:?}", branch_path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        ObjectId::try_parse(content)
            .map(Some)
            .with_context(|| format!("branch {name} holds an invalid commit id"))
    }

    pub fn update_branch(&self, name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        tracing::debug!(branch = %name, %oid, "updating branch");
        self.update_ref_file(self.branch_path(name), oid.to_string())
    }

    /// Point the current position at a new commit: the attached branch moves, or a
    /// detached HEAD is overwritten
    pub fn advance_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        match self.read_head()? {
            Head::Attached(branch) => self.update_branch(&branch, oid),
            Head::Detached(_) => self.write_head(&Head::Detached(oid.clone())),
        }
    }

    /// Snapshot the current commit into a new branch and attach HEAD to it
    pub fn create_branch(&self, name: &BranchName) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(RepositoryError::BranchExists(name.to_string()).into());
        }

        let source = self
            .resolve_head()?
            .map(|oid| oid.to_string())
            .unwrap_or_default();

        self.update_ref_file(self.branch_path(name), source)?;
        self.write_head(&Head::Attached(name.clone()))
    }

    fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        std::fs::write(&path, raw_ref.as_bytes())
            .with_context(|| format!("failed to write ref file at {:?}", path))
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }

    fn branch_path(&self, name: &BranchName) -> Box<Path> {
        self.heads_path().join(name.as_ref()).into_boxed_path()
    }
}
