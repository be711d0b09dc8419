//! HEAD pointer
//!
//! HEAD is either attached (`ref: refs/heads/<name>`) or detached (a literal commit id).

use crate::artifacts::branch::SYMREF_REGEX;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Attached(BranchName),
    Detached(ObjectId),
}

impl Head {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let content = content.trim();
        let re = regex::Regex::new(SYMREF_REGEX)
            .with_context(|| format!("invalid symref regex: {SYMREF_REGEX}"))?;

        match re.captures(content) {
            Some(symref) => Ok(Head::Attached(BranchName::try_parse(&symref[1])?)),
            None => Ok(Head::Detached(
                ObjectId::try_parse(content).context("HEAD is neither a ref nor a commit id")?,
            )),
        }
    }

    /// File content written to HEAD
    pub fn to_content(&self) -> String {
        match self {
            Head::Attached(branch) => format!("ref: {}", branch.as_ref_path()),
            Head::Detached(oid) => oid.to_string(),
        }
    }

    pub fn branch(&self) -> Option<&BranchName> {
        match self {
            Head::Attached(branch) => Some(branch),
            Head::Detached(_) => None,
        }
    }
}
