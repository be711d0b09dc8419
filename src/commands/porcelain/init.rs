use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::io::Write;

impl Repository {
    /// Create the control directory with its object buckets, refs and an empty index
    pub fn init(&mut self) -> anyhow::Result<()> {
        let control_path = self.control_path();
        if control_path.exists() {
            return Err(RepositoryError::AlreadyInitialized(control_path.to_path_buf()).into());
        }

        std::fs::create_dir_all(&control_path)
            .with_context(|| format!("Unable to create {}", control_path.display()))?;
        self.database().init()?;
        self.refs().init()?;
        Index::new(control_path.join("index").into_boxed_path()).rehydrate()?;

        tracing::info!(path = %control_path.display(), "initialized repository");
        writeln!(
            self.writer(),
            "Initialized empty sprig repository in {}",
            control_path.display()
        )?;

        Ok(())
    }
}
