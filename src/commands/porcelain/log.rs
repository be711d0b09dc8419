use crate::areas::repository::Repository;
use crate::artifacts::merge::ancestry::ancestry_chain;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::io::Write;

pub const RECORD_SEPARATOR: &str = "----------------------------------";

impl Repository {
    /// Print the first-parent history from HEAD, newest first
    pub fn log(&self) -> anyhow::Result<()> {
        let Some(head) = self.refs().resolve_head()? else {
            return Ok(());
        };

        for (position, commit_id) in ancestry_chain(self.database(), &head)?.iter().enumerate() {
            if position > 0 {
                writeln!(self.writer(), "{RECORD_SEPARATOR}")?;
            }

            let commit = self.database().parse_commit(commit_id)?;
            self.show_commit(commit_id, &commit)?;
        }

        Ok(())
    }

    fn show_commit(&self, commit_id: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        writeln!(self.writer(), "{}", format!("commit {commit_id}").yellow())?;
        if let [first, second] = commit.parents() {
            writeln!(
                self.writer(),
                "Merge: {} {}",
                first.to_short_oid(),
                second.to_short_oid()
            )?;
        }
        writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
        writeln!(self.writer(), "Date:   {}", commit.author().readable_timestamp())?;
        writeln!(self.writer())?;
        for message_line in commit.message().lines() {
            writeln!(self.writer(), "    {message_line}")?;
        }

        Ok(())
    }
}
