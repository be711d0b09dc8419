use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_type::ObjectType;
use std::path::{Path, PathBuf};

impl Repository {
    /// Stage files into the index
    ///
    /// `.` stages every file of the working tree and a directory stages the files below
    /// it. Paths that do not exist are skipped.
    pub async fn update_cache(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        for path in paths {
            for file in self.expand_path(path)? {
                self.stage_file(&mut index, &file)?;
            }
        }

        if index.has_changes() {
            index.write_updates()?;
        }

        Ok(())
    }

    /// Hash a working file into the store and record it in the in-memory index
    pub(crate) fn stage_file(&self, index: &mut Index, file: &str) -> anyhow::Result<()> {
        let content = self.workspace().read_file(file)?;
        let mode = self.workspace().file_mode(file)?;
        let oid = self.database().store(content, ObjectType::Blob)?;

        tracing::debug!(path = file, %oid, "staging file");
        index.add(IndexEntry::new(file.to_string(), mode, ObjectType::Blob, oid));

        Ok(())
    }

    fn expand_path(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        let full_path = self.path().join(path);

        if full_path.is_file() {
            return Ok(vec![self.workspace().relative_path(&full_path)?]);
        }

        if full_path.is_dir() {
            let files = self.workspace().list_files()?;
            let full_path = full_path.canonicalize()?;
            if full_path.as_path() == self.path() {
                return Ok(files);
            }

            let prefix = format!("{}/", self.workspace().relative_path(&full_path)?);
            return Ok(files
                .into_iter()
                .filter(|file| file.starts_with(&prefix))
                .collect());
        }

        tracing::warn!(path = %path.display(), "path does not exist, skipping");
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::repository::fixtures::initialized;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    fn write(repository: &Repository, path: &str, content: &str) {
        repository.workspace().write_file(path, content.as_bytes()).unwrap();
    }

    async fn staged_paths(repository: &Repository) -> Vec<String> {
        let index = repository.index();
        let mut index = index.lock().await;
        index.rehydrate().unwrap();

        index.entries().map(|entry| entry.path.clone()).collect()
    }

    #[tokio::test]
    async fn dot_stages_the_whole_working_tree() {
        let dir = TempDir::new().unwrap();
        let (repository, _) = initialized(&dir);
        write(&repository, "b.txt", "b");
        write(&repository, "a/c.txt", "c");

        repository.update_cache(&[PathBuf::from(".")]).await.unwrap();

        assert_eq!(staged_paths(&repository).await, vec!["a/c.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn dot_stages_dotfiles_but_not_hidden_directories() {
        let dir = TempDir::new().unwrap();
        let (repository, _) = initialized(&dir);
        write(&repository, ".gitignore", "target\n");
        write(&repository, "a.txt", "a");
        write(&repository, ".cache/state", "s");

        repository.update_cache(&[PathBuf::from(".")]).await.unwrap();

        assert_eq!(staged_paths(&repository).await, vec![".gitignore", "a.txt"]);
    }

    #[tokio::test]
    async fn directories_stage_only_their_files() {
        let dir = TempDir::new().unwrap();
        let (repository, _) = initialized(&dir);
        write(&repository, "b.txt", "b");
        write(&repository, "a/c.txt", "c");
        write(&repository, "ab/d.txt", "d");

        repository.update_cache(&[PathBuf::from("a")]).await.unwrap();

        assert_eq!(staged_paths(&repository).await, vec!["a/c.txt"]);
    }

    #[tokio::test]
    async fn missing_paths_are_skipped() {
        let dir = TempDir::new().unwrap();
        let (repository, _) = initialized(&dir);
        write(&repository, "b.txt", "b");

        repository
            .update_cache(&[PathBuf::from("missing.txt"), PathBuf::from("b.txt")])
            .await
            .unwrap();

        assert_eq!(staged_paths(&repository).await, vec!["b.txt"]);
    }

    #[tokio::test]
    async fn restaging_replaces_the_entry() {
        let dir = TempDir::new().unwrap();
        let (repository, _) = initialized(&dir);
        write(&repository, "b.txt", "one");
        repository.update_cache(&[PathBuf::from("b.txt")]).await.unwrap();
        write(&repository, "b.txt", "two");
        repository.update_cache(&[PathBuf::from("b.txt")]).await.unwrap();

        let index = repository.index();
        let mut index = index.lock().await;
        index.rehydrate().unwrap();

        assert_eq!(index.entries_count(), 1);
        let entry = index.entry_by_path("b.txt").unwrap();
        assert_eq!(repository.database().parse_blob(&entry.oid).unwrap().text(), "two");
    }
}
