use crate::artifacts::branch::head::Head;
use colored::Colorize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub head: Head,
    /// Tracked files whose content differs from the staged blob
    pub modified: BTreeSet<String>,
    /// Tracked files missing from the working tree
    pub deleted: BTreeSet<String>,
    pub untracked: BTreeSet<String>,
}

impl StatusReport {
    pub fn new(head: Head) -> Self {
        StatusReport {
            head,
            modified: BTreeSet::new(),
            deleted: BTreeSet::new(),
            untracked: BTreeSet::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty() && self.untracked.is_empty()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.head {
            Head::Attached(branch) => writeln!(f, "On branch {branch}")?,
            Head::Detached(oid) => writeln!(f, "HEAD detached at {}", oid.to_short_oid())?,
        }

        if self.is_clean() {
            return writeln!(f, "nothing to commit, working tree clean");
        }

        if !self.modified.is_empty() || !self.deleted.is_empty() {
            writeln!(f, "Changes not staged for commit:")?;
            let changes = self
                .modified
                .iter()
                .map(|path| (path, "modified:   "))
                .chain(self.deleted.iter().map(|path| (path, "deleted:    ")))
                .collect::<std::collections::BTreeMap<_, _>>();
            for (path, label) in changes {
                writeln!(f, "\t{}{}", label.red(), path.red())?;
            }
        }

        if !self.untracked.is_empty() {
            writeln!(f, "Untracked files:")?;
            for path in &self.untracked {
                writeln!(f, "\t{}", path.red())?;
            }
        }

        Ok(())
    }
}
