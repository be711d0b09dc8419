use crate::areas::repository::Repository;
use crate::artifacts::diff::tool::DiffSide;
use crate::artifacts::status::status_report::StatusReport;
use std::io::Write;

impl Repository {
    /// Print how the working tree differs from the index
    pub async fn status(&self) -> anyhow::Result<StatusReport> {
        let report = self.inspect_working_tree().await?;

        write!(self.writer(), "{report}")?;

        Ok(report)
    }

    async fn inspect_working_tree(&self) -> anyhow::Result<StatusReport> {
        let mut report = StatusReport::new(self.refs().read_head()?);

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        for entry in index.entries() {
            if !self.workspace().is_file(&entry.path) {
                report.deleted.insert(entry.path.clone());
                continue;
            }

            let staged = self.database().parse_blob(&entry.oid)?;
            let working = self.workspace().read_file(&entry.path)?;
            let patch = self.diff_tool().compute_diff(
                &DiffSide::new(entry.path.clone(), Some(staged.content().clone())),
                &DiffSide::new(entry.path.clone(), Some(working)),
            )?;

            if !patch.is_empty() {
                report.modified.insert(entry.path.clone());
            }
        }

        for file in self.workspace().list_files()? {
            if index.entry_by_path(&file).is_none() {
                report.untracked.insert(file);
            }
        }

        Ok(report)
    }
}
