use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, RawObject, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Write};
use std::path::Path;

/// Number of two-hex-digit buckets pre-created by `init`
pub const BUCKET_COUNT: usize = 256;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Create the objects directory and every `00`..`ff` bucket
    pub fn init(&self) -> anyhow::Result<()> {
        for bucket in 0..BUCKET_COUNT {
            let bucket_path = self.path.join(format!("{bucket:02x}"));
            std::fs::create_dir_all(&bucket_path).with_context(|| {
                format!("Unable to create object bucket {}", bucket_path.display())
            })?;
        }

        Ok(())
    }

    /// Hash and persist a payload of the given kind, returning its id
    ///
    /// Re-storing identical content rewrites an identical file.
    pub fn store(&self, payload: Bytes, kind: ObjectType) -> anyhow::Result<ObjectId> {
        let canonical = RawObject::new(kind, payload).canonical()?;
        let object_id = ObjectId::digest(&canonical);

        self.write_object(&object_id, canonical)?;
        tracing::debug!(oid = %object_id, %kind, "stored object");

        Ok(object_id)
    }

    pub fn store_object(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        self.store(object.serialize()?, object.object_type())
    }

    pub fn retrieve(&self, object_id: &ObjectId) -> anyhow::Result<RawObject> {
        let object_path = self.path.join(object_id.to_path());
        if !object_path.is_file() {
            return Err(RepositoryError::ObjectNotFound(object_id.to_string()).into());
        }

        let compressed = std::fs::read(&object_path)
            .with_context(|| format!("Unable to read object file {}", object_path.display()))?;
        let canonical = Self::decompress(compressed.into())?;

        RawObject::parse(canonical).with_context(|| format!("Malformed object {object_id}"))
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        ObjectBox::from_raw(self.retrieve(object_id)?)
    }

    pub fn parse_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let raw = self.retrieve(object_id)?;
        match raw.kind {
            ObjectType::Blob => Blob::deserialize(raw.payload),
            other => anyhow::bail!("object {object_id} is a {other}, not a blob"),
        }
    }

    /// Fails with `InvalidTreeReference` when the id names anything but a tree
    pub fn parse_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        let raw = self.retrieve(object_id)?;
        match raw.kind {
            ObjectType::Tree => Tree::deserialize(raw.payload),
            _ => Err(RepositoryError::InvalidTreeReference(object_id.to_string()).into()),
        }
    }

    pub fn parse_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let raw = self.retrieve(object_id)?;
        match raw.kind {
            ObjectType::Commit => Commit::deserialize(raw.payload),
            other => anyhow::bail!("object {object_id} is a {other}, not a commit"),
        }
    }

    /// Map every blob reachable from a tree to its `/`-separated path under `prefix`
    pub fn flatten_tree(
        &self,
        tree_id: &ObjectId,
        prefix: &str,
    ) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let mut files = BTreeMap::new();
        let mut on_path = HashSet::new();

        self.collect_tree(tree_id, prefix, &mut files, &mut on_path)?;

        Ok(files)
    }

    /// Flatten the tree a commit points at
    pub fn flatten_commit(&self, commit_id: &ObjectId) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let commit = self.parse_commit(commit_id)?;
        self.flatten_tree(commit.tree_oid(), "")
    }

    fn collect_tree(
        &self,
        tree_id: &ObjectId,
        prefix: &str,
        files: &mut BTreeMap<String, ObjectId>,
        on_path: &mut HashSet<ObjectId>,
    ) -> anyhow::Result<()> {
        // identical subdirectories share an id, so only the current descent path counts
        if !on_path.insert(tree_id.clone()) {
            tracing::warn!(tree = %tree_id, prefix, "tree refers back to itself, skipping");
            return Ok(());
        }

        let tree = self.parse_tree(tree_id)?;
        for entry in tree.entries() {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{prefix}/{}", entry.name)
            };

            match entry.kind {
                ObjectType::Tree => self.collect_tree(&entry.oid, &path, files, on_path)?,
                _ => {
                    files.insert(path, entry.oid);
                }
            }
        }

        on_path.remove(tree_id);
        Ok(())
    }

    fn write_object(&self, object_id: &ObjectId, canonical: Bytes) -> anyhow::Result<()> {
        let object_path = self.path.join(object_id.to_path());
        let object_dir = object_path
            .parent()
            .with_context(|| format!("Invalid object path {}", object_path.display()))?;

        // buckets are normally made by init, but a missing one is not an error
        std::fs::create_dir_all(object_dir)
            .with_context(|| format!("Unable to create object directory {}", object_dir.display()))?;

        let compressed = Self::compress(canonical)?;

        let mut temp_file = tempfile::Builder::new()
            .prefix("tmp-obj-")
            .tempfile_in(object_dir)
            .with_context(|| format!("Unable to open temp object in {}", object_dir.display()))?;
        temp_file
            .write_all(&compressed)
            .with_context(|| format!("Unable to write object {object_id}"))?;

        // rename over the final name so readers never see a partial object
        temp_file
            .persist(&object_path)
            .with_context(|| format!("Unable to rename object file to {}", object_path.display()))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::index_entry::IndexEntry;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn objects_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    #[rstest]
    fn init_creates_every_bucket(objects_dir: TempDir) {
        let database = database(&objects_dir);
        database.init().unwrap();

        let buckets = std::fs::read_dir(database.objects_path()).unwrap().count();
        assert_eq!(buckets, BUCKET_COUNT);
        assert!(database.objects_path().join("00").is_dir());
        assert!(database.objects_path().join("ff").is_dir());
    }

    #[rstest]
    fn stored_blob_reads_back(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database
            .store(Bytes::from_static(b"hello world\n"), ObjectType::Blob)
            .unwrap();

        let raw = database.retrieve(&oid).unwrap();
        assert_eq!(raw.kind, ObjectType::Blob);
        assert_eq!(raw.size, 12);
        assert_eq!(raw.payload, Bytes::from_static(b"hello world\n"));
        assert_eq!(oid.as_ref(), "3b18e512dba79e4c8300dd08aeb37f8e728b8dad");
    }

    #[rstest]
    fn storing_twice_is_idempotent(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let first = database.store(Bytes::from_static(b"same"), ObjectType::Blob).unwrap();
        let second = database.store(Bytes::from_static(b"same"), ObjectType::Blob).unwrap();

        assert_eq!(first, second);
        let bucket = database.objects_path().join(&first.as_ref()[..2]);
        assert_eq!(std::fs::read_dir(bucket).unwrap().count(), 1);
    }

    #[rstest]
    fn missing_object_is_reported(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = ObjectId::digest(b"nothing here");

        let error = database.retrieve(&oid).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::ObjectNotFound(_))
        ));
    }

    #[rstest]
    fn blob_is_not_a_tree_reference(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.store(Bytes::from_static(b"x"), ObjectType::Blob).unwrap();

        let error = database.parse_tree(&oid).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::InvalidTreeReference(_))
        ));
    }

    #[rstest]
    fn flatten_walks_nested_trees(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let a = database.store(Bytes::from_static(b"a"), ObjectType::Blob).unwrap();
        let b = database.store(Bytes::from_static(b"b"), ObjectType::Blob).unwrap();
        let entries = [
            IndexEntry::new("a.txt".to_string(), 0, ObjectType::Blob, a.clone()),
            IndexEntry::new("dir/sub/b".to_string(), 0, ObjectType::Blob, b.clone()),
            IndexEntry::new("other/b".to_string(), 0, ObjectType::Blob, b.clone()),
        ];

        let tree = Tree::build(entries.iter()).unwrap();
        let mut root = None;
        tree.traverse(&mut |tree: &Tree| {
            root = Some(database.store_object(tree)?);
            Ok(())
        })
        .unwrap();

        let files = database.flatten_tree(&root.unwrap(), "").unwrap();
        assert_eq!(
            files,
            BTreeMap::from([
                ("a.txt".to_string(), a),
                ("dir/sub/b".to_string(), b.clone()),
                ("other/b".to_string(), b),
            ])
        );
    }

    proptest! {
        #[test]
        fn any_payload_round_trips(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
            let dir = TempDir::new().unwrap();
            let database = database(&dir);
            let oid = database.store(Bytes::from(payload.clone()), ObjectType::Blob).unwrap();

            let raw = database.retrieve(&oid).unwrap();
            prop_assert_eq!(raw.kind, ObjectType::Blob);
            prop_assert_eq!(raw.size, payload.len());
            prop_assert_eq!(raw.payload.to_vec(), payload);
        }
    }
}
