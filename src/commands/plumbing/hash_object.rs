use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Store a file's content as a blob and print the blob id
    pub fn hash_object(&self, file: &Path) -> anyhow::Result<()> {
        let file_path = self.path().join(file);
        if !file_path.is_file() {
            return Err(RepositoryError::FileNotFound(file_path).into());
        }

        let content = std::fs::read(&file_path)
            .with_context(|| format!("Unable to read file {}", file_path.display()))?;
        let object_id = self.database().store(Bytes::from(content), ObjectType::Blob)?;

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}
