use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    /// Commit a stored tree on top of HEAD and print the commit id
    pub fn commit_tree(&self, tree_id: &str, message: &str) -> anyhow::Result<()> {
        let tree_id = ObjectId::try_parse(tree_id)
            .map_err(|_| RepositoryError::InvalidTreeReference(tree_id.to_string()))?;
        let parents = self.refs().resolve_head()?.into_iter().collect();

        let commit_id = self.create_commit(&tree_id, message, parents)?;

        writeln!(self.writer(), "{commit_id}")?;

        Ok(())
    }

    /// Store a commit for `tree_id` and advance HEAD (the attached branch, or HEAD
    /// itself when detached) to it
    pub(crate) fn create_commit(
        &self,
        tree_id: &ObjectId,
        message: &str,
        parents: Vec<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        let is_tree = self
            .database()
            .retrieve(tree_id)
            .is_ok_and(|raw| raw.kind == ObjectType::Tree);
        if !is_tree {
            return Err(RepositoryError::InvalidTreeReference(tree_id.to_string()).into());
        }

        let identity = self.config().identity()?;
        let author = Author::from_identity(identity, self.config().author_date);
        let commit = Commit::new(parents, tree_id.clone(), author, message.to_string());

        let commit_id = self.database().store_object(&commit)?;
        self.refs().advance_head(&commit_id)?;

        tracing::info!(commit = %commit_id, tree = %tree_id, "created commit");

        Ok(commit_id)
    }
}
