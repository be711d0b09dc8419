use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::io::Write;

impl Repository {
    /// Store the index as a tree hierarchy and print the root tree id
    pub async fn write_tree(&self) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;
        let tree_id = self.store_index_tree(&index)?;

        writeln!(self.writer(), "{tree_id}")?;

        Ok(())
    }

    /// Store every directory of the index bottom-up and return the root tree id
    pub(crate) fn store_index_tree(&self, index: &Index) -> anyhow::Result<ObjectId> {
        let tree = Tree::build(index.entries())?;
        tree.traverse(&mut |tree: &Tree| self.database().store_object(tree).map(|_| ()))?;

        tree.object_id()
    }
}
