use crate::areas::repository::Repository;
use crate::artifacts::diff::tool::DiffSide;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use colored::Colorize;
use std::collections::BTreeSet;
use std::io::Write;

impl Repository {
    /// Print a patch for every path that differs between two commits, in path order
    pub fn diff(&self, old_commit: &str, new_commit: &str) -> anyhow::Result<()> {
        let old_files = self.database().flatten_commit(&Self::parse_commit_id(old_commit)?)?;
        let new_files = self.database().flatten_commit(&Self::parse_commit_id(new_commit)?)?;

        let paths = old_files.keys().chain(new_files.keys()).collect::<BTreeSet<_>>();
        for path in paths {
            let (old_oid, new_oid) = (old_files.get(path), new_files.get(path));
            if old_oid == new_oid {
                continue;
            }

            let old = DiffSide::new(path.clone(), self.blob_content(old_oid)?);
            let new = DiffSide::new(path.clone(), self.blob_content(new_oid)?);
            let patch = self.diff_tool().compute_diff(&old, &new)?;

            self.print_patch(&patch)?;
        }

        Ok(())
    }

    fn parse_commit_id(commit_id: &str) -> anyhow::Result<ObjectId> {
        ObjectId::try_parse(commit_id)
            .map_err(|_| RepositoryError::ObjectNotFound(commit_id.to_string()).into())
    }

    fn print_patch(&self, patch: &str) -> anyhow::Result<()> {
        for line in patch.lines() {
            let line = if line.starts_with("diff ")
                || line.starts_with("--- ")
                || line.starts_with("+++ ")
            {
                line.bold()
            } else if line.starts_with("@@") {
                line.cyan()
            } else if line.starts_with('+') {
                line.green()
            } else if line.starts_with('-') {
                line.red()
            } else {
                line.normal()
            };

            writeln!(self.writer(), "{line}")?;
        }

        Ok(())
    }
}
