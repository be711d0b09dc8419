//! Tree object
//!
//! Trees represent directory snapshots. They contain entries for files (blobs)
//! and subdirectories (other trees).
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`, where the entries are `<kind> <id> <name>`
//! triples joined by single spaces, ordered by name. Names therefore may not contain
//! whitespace.
//!
//! ## Tree Building
//!
//! A tree is built from the flat, path-keyed index: every path is split into
//! segments and grouped into nested directories. Whether a segment becomes a blob or
//! a subtree is decided by the index entry's own kind tag, never by its name.

use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;

/// A single `<kind> <id> <name>` record of a tree payload
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub kind: ObjectType,
    pub oid: ObjectId,
    pub name: String,
}

#[derive(Debug, Clone)]
enum TreeNode {
    /// Entry whose object already exists (staged blob, staged subtree, or decoded entry)
    Entry(TreeEntry),
    /// Directory being built from the index; its id is known only after encoding
    Directory(Tree),
}

impl TreeNode {
    fn object_type(&self) -> ObjectType {
        match self {
            TreeNode::Entry(entry) => entry.kind,
            TreeNode::Directory(_) => ObjectType::Tree,
        }
    }

    fn oid(&self) -> anyhow::Result<ObjectId> {
        match self {
            TreeNode::Entry(entry) => Ok(entry.oid.clone()),
            TreeNode::Directory(tree) => tree.object_id(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: BTreeMap<String, TreeNode>,
}

impl Tree {
    /// Build a tree hierarchy from index entries
    ///
    /// The returned root still has to be stored bottom-up with [`Tree::traverse`].
    pub fn build<'e>(entries: impl Iterator<Item = &'e IndexEntry>) -> anyhow::Result<Self> {
        let mut root = Self::default();

        for entry in entries {
            let segments = entry.segments();
            root.add_entry(&segments, entry)
                .with_context(|| format!("Unable to place {} in the tree", entry.path))?;
        }

        Ok(root)
    }

    /// Visit every directory depth-first, children before parents, so that child
    /// ids exist in the store before the parent that names them.
    pub fn traverse<F>(&self, func: &mut F) -> anyhow::Result<()>
    where
        F: FnMut(&Tree) -> anyhow::Result<()>,
    {
        for node in self.entries.values() {
            if let TreeNode::Directory(tree) = node {
                tree.traverse(func)?;
            }
        }
        func(self)
    }

    fn add_entry(&mut self, segments: &[&str], entry: &IndexEntry) -> anyhow::Result<()> {
        let (name, rest) = segments
            .split_first()
            .context("Empty path in index entry")?;

        if name.chars().any(char::is_whitespace) {
            anyhow::bail!("path segment {name:?} contains whitespace");
        }

        if rest.is_empty() {
            if let Some(TreeNode::Directory(_)) = self.entries.get(*name) {
                anyhow::bail!("{name} is both a file and a directory");
            }
            self.entries.insert(
                name.to_string(),
                TreeNode::Entry(TreeEntry::new(entry.kind, entry.oid.clone(), name.to_string())),
            );
            return Ok(());
        }

        let node = self
            .entries
            .entry(name.to_string())
            .or_insert_with(|| TreeNode::Directory(Tree::default()));

        match node {
            TreeNode::Directory(tree) => tree.add_entry(rest, entry),
            TreeNode::Entry(_) => anyhow::bail!("{name} is both a file and a directory"),
        }
    }

    /// Entries in name order (as decoded from the store or directly staged)
    pub fn entries(&self) -> impl Iterator<Item = TreeEntry> + '_ {
        self.entries.iter().filter_map(|(name, node)| {
            Some(TreeEntry::new(node.object_type(), node.oid().ok()?, name.clone()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let triples = self
            .entries
            .iter()
            .map(|(name, node)| Ok(format!("{} {} {}", node.object_type(), node.oid()?, name)))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Bytes::from(triples.join(" ")))
    }
}

impl Unpackable for Tree {
    fn deserialize(payload: Bytes) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(&payload).context("Tree payload is not UTF-8")?;
        let fields = text.split_whitespace().collect::<Vec<_>>();

        if fields.len() % 3 != 0 {
            anyhow::bail!("Tree payload has {} fields, expected triples", fields.len());
        }

        let mut entries = BTreeMap::new();
        for triple in fields.chunks(3) {
            let kind = ObjectType::try_from(triple[0])?;
            let oid = ObjectId::try_parse(triple[1])?;
            let name = triple[2].to_string();

            entries.insert(name.clone(), TreeNode::Entry(TreeEntry::new(kind, oid, name)));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries()
            .map(|entry| format!("{} {}\t{}", entry.kind, entry.oid, entry.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
