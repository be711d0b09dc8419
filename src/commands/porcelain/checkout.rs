use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::RepositoryError;
use std::io::Write;

/// Mode recorded for entries restored from a tree
pub const CHECKOUT_MODE: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    Branch(String),
    Commit(String),
}

impl Repository {
    /// Point HEAD at a branch or commit and replace the working tree and index with
    /// its tree
    pub async fn checkout(&self, target: &CheckoutTarget) -> anyhow::Result<()> {
        let (head, commit_id) = match target {
            CheckoutTarget::Branch(name) => {
                let branch = BranchName::try_parse(name.as_str())?;
                let tip = self.refs().read_branch(&branch)?;
                (Head::Attached(branch), tip)
            }
            CheckoutTarget::Commit(id) => {
                let oid = ObjectId::try_parse(id)
                    .map_err(|_| RepositoryError::ObjectNotFound(id.to_string()))?;
                (Head::Detached(oid.clone()), Some(oid))
            }
        };

        let commit = match &commit_id {
            Some(commit_id) => Some(self.database().parse_commit(commit_id)?),
            None => None,
        };
        let tree_id = commit.as_ref().map(|commit| commit.tree_oid().clone());

        self.refs().write_head(&head)?;

        let index = self.index();
        let mut index = index.lock().await;
        self.materialize_tree(&mut index, tree_id.as_ref())?;

        tracing::info!(head = head.to_content(), "checked out");
        match head {
            Head::Attached(branch) => writeln!(self.writer(), "Switched to branch '{branch}'")?,
            Head::Detached(oid) => writeln!(
                self.writer(),
                "HEAD is now at {} {}",
                oid.to_short_oid(),
                commit.map(|commit| commit.short_message()).unwrap_or_default()
            )?,
        }

        Ok(())
    }

    /// Replace every tracked file and the index with the content of `tree_id`
    ///
    /// Tracked files are deleted and their emptied directories pruned before the tree
    /// is written out. `None` leaves an empty working tree and index. HEAD is not
    /// touched.
    pub(crate) fn materialize_tree(
        &self,
        index: &mut Index,
        tree_id: Option<&ObjectId>,
    ) -> anyhow::Result<()> {
        index.rehydrate()?;

        let tracked = index
            .entries()
            .map(|entry| entry.path.clone())
            .collect::<Vec<_>>();
        for path in &tracked {
            self.workspace().remove_file(path)?;
        }
        self.workspace()
            .prune_empty_dirs(tracked.iter().map(String::as_str))?;

        index.discard_all();

        let files = match tree_id {
            Some(tree_id) => self.database().flatten_tree(tree_id, "")?,
            None => Default::default(),
        };

        for (path, oid) in files {
            let blob = self.database().parse_blob(&oid)?;
            self.workspace().write_file(&path, blob.content())?;
            index.add(IndexEntry::new(path, CHECKOUT_MODE, ObjectType::Blob, oid));
        }

        index.write_updates()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::repository::fixtures::initialized;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    async fn commit_all(repository: &Repository, message: &str) -> ObjectId {
        repository.update_cache(&[PathBuf::from(".")]).await.unwrap();
        let index = repository.index();
        let mut index = index.lock().await;
        index.rehydrate().unwrap();
        let tree = repository.store_index_tree(&index).unwrap();
        let parents = repository.refs().resolve_head().unwrap().into_iter().collect();

        repository.create_commit(&tree, message, parents).unwrap()
    }

    #[tokio::test]
    async fn switching_branches_swaps_the_working_tree() {
        let dir = TempDir::new().unwrap();
        let (repository, output) = initialized(&dir);
        repository.workspace().write_file("a.txt", b"one").unwrap();
        commit_all(&repository, "first").await;
        repository.branch("topic").unwrap();
        repository.workspace().write_file("dir/b.txt", b"two").unwrap();
        repository.workspace().write_file("a.txt", b"changed").unwrap();
        commit_all(&repository, "second").await;
        output.take();

        repository
            .checkout(&CheckoutTarget::Branch("master".to_string()))
            .await
            .unwrap();

        assert_eq!(output.take(), "Switched to branch 'master'\n");
        assert_eq!(repository.workspace().read_file("a.txt").unwrap(), "one");
        assert!(!repository.path().join("dir").exists());

        let index = repository.index();
        let mut index = index.lock().await;
        index.rehydrate().unwrap();
        let entries = index.entries().cloned().collect::<Vec<_>>();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mode, CHECKOUT_MODE);
    }

    #[tokio::test]
    async fn commits_detach_head() {
        let dir = TempDir::new().unwrap();
        let (repository, output) = initialized(&dir);
        repository.workspace().write_file("a.txt", b"one").unwrap();
        let first = commit_all(&repository, "first").await;
        repository.workspace().write_file("a.txt", b"two").unwrap();
        commit_all(&repository, "second").await;
        output.take();

        repository
            .checkout(&CheckoutTarget::Commit(first.to_string()))
            .await
            .unwrap();

        assert_eq!(repository.refs().read_head().unwrap(), Head::Detached(first));
        assert_eq!(repository.workspace().read_file("a.txt").unwrap(), "one");
    }

    #[tokio::test]
    async fn missing_branches_are_reported() {
        let dir = TempDir::new().unwrap();
        let (repository, _) = initialized(&dir);

        let error = repository
            .checkout(&CheckoutTarget::Branch("nope".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::BranchNotFound(_))
        ));
    }
}
