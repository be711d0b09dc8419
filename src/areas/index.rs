//! Staging area
//!
//! The index tracks which paths go into the next tree. It is persisted as a single
//! binary file (see [`crate::artifacts::index`]) that is rewritten in full after every
//! mutation. There is no locking: one process per repository is assumed.
//!
//! ## Data Structures
//!
//! - `entries`: Maps `/`-separated paths to their index entries, which keeps them
//!   sorted by path after every mutation
//! - `header`: Signature, version and the entry count written on the next flush

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{ENTRY_FIXED_SIZE, HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::RepositoryError;
use anyhow::{Context, anyhow};
use byteorder::{ByteOrder, NetworkEndian};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    path: Box<Path>,
    entries: BTreeMap<String, IndexEntry>,
    header: IndexHeader,
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            header: IndexHeader::empty(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry count as recorded in the header
    pub fn entries_count(&self) -> u32 {
        self.header.entries_count
    }

    pub fn has_changes(&self) -> bool {
        self.changed
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the index from disk
    ///
    /// A missing file is created and persisted empty first. A zero-length file is
    /// read as an empty index. Anything else that fails to decode is `IndexCorrupt`.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path.exists() {
            self.write_updates()?;
            return Ok(());
        }

        let index_file = std::fs::File::open(&self.path)
            .with_context(|| format!("Unable to open index file {}", self.path.display()))?;
        if index_file.metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(std::io::BufReader::new(index_file));
        self.parse(&mut reader).map_err(|error| {
            self.clear();
            RepositoryError::IndexCorrupt(format!("{error:#}"))
        })?;

        Ok(())
    }

    fn parse<R: Read>(&mut self, reader: &mut Checksum<R>) -> anyhow::Result<()> {
        let entries_count = self.parse_header(reader)?;
        self.parse_entries(entries_count, reader)?;
        reader.verify()?;

        if self.entries.len() != entries_count as usize {
            return Err(anyhow!(
                "header announces {entries_count} entries, found {} distinct paths",
                self.entries.len()
            ));
        }

        Ok(())
    }

    fn parse_header<R: Read>(&self, reader: &mut Checksum<R>) -> anyhow::Result<u32> {
        let header = IndexHeader::deserialize(reader.read(HEADER_SIZE)?)?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid index file signature"));
        }

        if header.version != VERSION {
            return Err(anyhow!("Unsupported index file version: {}", header.version));
        }

        Ok(header.entries_count)
    }

    fn parse_entries<R: Read>(
        &mut self,
        entries_count: u32,
        reader: &mut Checksum<R>,
    ) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let length = NetworkEndian::read_u32(&reader.read(4)?) as usize;
            if length < ENTRY_FIXED_SIZE || length > ENTRY_FIXED_SIZE + u16::MAX as usize {
                return Err(anyhow!("Implausible index entry length {length}"));
            }

            let entry = IndexEntry::deserialize(reader.read(length)?)?;
            self.entries.insert(entry.path.clone(), entry);
        }

        self.header.entries_count = entries_count;

        Ok(())
    }

    /// Stage an entry in memory, replacing any entry with the same path
    ///
    /// Returns whether the path was new. The count only grows on a true insertion.
    pub fn add(&mut self, entry: IndexEntry) -> bool {
        let inserted = self.entries.insert(entry.path.clone(), entry).is_none();
        if inserted {
            self.header.entries_count += 1;
        }
        self.changed = true;

        inserted
    }

    /// Drop a path from memory; returns whether anything was removed
    pub fn discard(&mut self, path: &str) -> bool {
        let removed = self.entries.remove(path).is_some();
        if removed {
            self.header.entries_count -= 1;
            self.changed = true;
        }

        removed
    }

    /// Drop every entry from memory; returns whether the index was non-empty
    pub fn discard_all(&mut self) -> bool {
        let had_entries = !self.entries.is_empty();
        self.entries.clear();
        self.header.entries_count = 0;
        self.changed = true;

        had_entries
    }

    /// Load, stage, persist
    pub fn insert(&mut self, entry: IndexEntry) -> anyhow::Result<bool> {
        self.rehydrate()?;
        let inserted = self.add(entry);
        self.write_updates()?;

        Ok(inserted)
    }

    /// Load, remove one path, persist
    pub fn remove(&mut self, path: &str) -> anyhow::Result<bool> {
        self.rehydrate()?;
        let removed = self.discard(path);
        self.write_updates()?;

        Ok(removed)
    }

    /// Load, clear, persist
    pub fn remove_all(&mut self) -> anyhow::Result<bool> {
        self.rehydrate()?;
        let removed = self.discard_all();
        self.write_updates()?;

        Ok(removed)
    }

    /// Rewrite the whole index file from memory
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .with_context(|| format!("Unable to open index file {}", self.path.display()))?;

        let mut writer = Checksum::new(std::io::BufWriter::new(index_file));

        self.header = IndexHeader {
            entries_count: self.entries.len() as u32,
            ..self.header.clone()
        };
        writer.write(&self.header.serialize()?)?;

        for entry in self.entries.values() {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;
        self.changed = false;
        tracing::debug!(entries = self.entries.len(), "wrote index");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object_id::ObjectId;
    use crate::artifacts::objects::object_type::ObjectType;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn index_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn index(dir: &TempDir) -> Index {
        Index::new(dir.path().join("index").into_boxed_path())
    }

    fn entry(path: &str, seed: &str) -> IndexEntry {
        IndexEntry::new(
            path.to_string(),
            0o100644,
            ObjectType::Blob,
            ObjectId::digest(seed.as_bytes()),
        )
    }

    fn assert_corrupt(result: anyhow::Result<()>) {
        let error = result.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::IndexCorrupt(_))
        ));
    }

    #[rstest]
    fn missing_index_is_created_empty(index_dir: TempDir) {
        let mut index = index(&index_dir);
        index.rehydrate().unwrap();

        assert!(index.is_empty());
        index_dir.child("index").assert(predicates::path::is_file());
    }

    #[rstest]
    fn insert_replaces_existing_path(index_dir: TempDir) {
        let mut index = index(&index_dir);

        assert!(index.insert(entry("b.txt", "one")).unwrap());
        assert!(index.insert(entry("a.txt", "two")).unwrap());
        assert!(!index.insert(entry("b.txt", "three")).unwrap());

        let mut reloaded = self::index(&index_dir);
        reloaded.rehydrate().unwrap();

        let paths = reloaded.entries().map(|e| e.path.as_str()).collect::<Vec<_>>();
        assert_eq!(paths, vec!["a.txt", "b.txt"]);
        assert_eq!(reloaded.entries_count(), 2);
        assert_eq!(
            reloaded.entry_by_path("b.txt").unwrap().oid,
            ObjectId::digest(b"three")
        );
    }

    #[rstest]
    fn remove_reports_whether_anything_changed(index_dir: TempDir) {
        let mut index = index(&index_dir);
        index.insert(entry("a.txt", "a")).unwrap();

        assert!(index.remove("a.txt").unwrap());
        assert!(!index.remove("a.txt").unwrap());
        assert!(!index.remove_all().unwrap());
    }

    #[rstest]
    fn truncated_index_is_corrupt(index_dir: TempDir) {
        let mut index = index(&index_dir);
        index.insert(entry("a.txt", "a")).unwrap();

        let bytes = std::fs::read(index.path()).unwrap();
        std::fs::write(index.path(), &bytes[..bytes.len() - 5]).unwrap();

        assert_corrupt(index.rehydrate());
    }

    #[rstest]
    fn foreign_file_is_corrupt(index_dir: TempDir) {
        index_dir.child("index").write_str("DIRC not ours at all").unwrap();

        assert_corrupt(index(&index_dir).rehydrate());
    }

    #[rstest]
    fn flipped_byte_fails_the_checksum(index_dir: TempDir) {
        let mut index = index(&index_dir);
        index.insert(entry("a.txt", "a")).unwrap();

        let mut bytes = std::fs::read(index.path()).unwrap();
        let last_path_byte = bytes.len() - 21;
        bytes[last_path_byte] ^= 0x01;
        std::fs::write(index.path(), bytes).unwrap();

        assert_corrupt(index.rehydrate());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(String),
        Remove(String),
    }

    fn op() -> impl Strategy<Value = Op> {
        let path = "[a-c]{1,2}(/[a-c]{1,2})?";
        prop_oneof![
            path.prop_map(Op::Insert),
            path.prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn entries_stay_sorted_and_counted(ops in proptest::collection::vec(op(), 1..24)) {
            let dir = TempDir::new().unwrap();
            let mut index = index(&dir);

            for op in ops {
                match op {
                    Op::Insert(path) => { index.insert(entry(&path, &path)).unwrap(); }
                    Op::Remove(path) => { index.remove(&path).unwrap(); }
                }
            }

            let mut reloaded = self::index(&dir);
            reloaded.rehydrate().unwrap();
            let paths = reloaded.entries().map(|e| e.path.clone()).collect::<Vec<_>>();
            let mut sorted = paths.clone();
            sorted.sort();
            sorted.dedup();

            prop_assert_eq!(&paths, &sorted);
            prop_assert_eq!(reloaded.entries_count() as usize, paths.len());
        }
    }
}
