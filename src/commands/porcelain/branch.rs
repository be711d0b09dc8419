use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use std::io::Write;

impl Repository {
    /// Create a branch at the current commit and switch to it
    pub fn branch(&self, name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(name)?;

        self.refs().create_branch(&branch_name)?;

        writeln!(self.writer(), "Switched to a new branch '{branch_name}'")?;

        Ok(())
    }
}
