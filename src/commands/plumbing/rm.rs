use crate::areas::repository::Repository;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Unstage a path, or every path with `.`; the working file is left alone
    pub async fn rm(&self, path: &Path) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        let removed = if path == Path::new(".") {
            index.remove_all()?
        } else {
            let relative = self.workspace().relative_path(&self.path().join(path))?;
            index.remove(&relative)?
        };

        if removed {
            writeln!(self.writer(), "removed")?;
        } else {
            writeln!(self.writer(), "nothing to remove")?;
        }

        Ok(())
    }
}
