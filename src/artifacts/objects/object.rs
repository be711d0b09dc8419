use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::{Context, Result};
use bytes::Bytes;
use std::io::Write;

/// Encodes an object into its payload (everything after the `<kind> <size>\0` header)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Decodes an object from its payload
pub trait Unpackable {
    fn deserialize(payload: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    fn object_id(&self) -> Result<ObjectId> {
        let raw = RawObject::new(self.object_type(), self.serialize()?);
        Ok(ObjectId::digest(&raw.canonical()?))
    }
}

/// An object as it exists in the store: kind, declared size and payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub kind: ObjectType,
    pub size: usize,
    pub payload: Bytes,
}

impl RawObject {
    pub fn new(kind: ObjectType, payload: Bytes) -> Self {
        RawObject {
            kind,
            size: payload.len(),
            payload,
        }
    }

    /// `"<kind> <len>\0" + payload`, the representation that is hashed and compressed
    pub fn canonical(&self) -> Result<Bytes> {
        let mut bytes = Vec::with_capacity(self.payload.len() + 32);
        write!(bytes, "{} {}\0", self.kind.as_str(), self.payload.len())?;
        bytes.write_all(&self.payload)?;

        Ok(Bytes::from(bytes))
    }

    /// Split a decompressed object on its first NUL byte into header and payload
    pub fn parse(data: Bytes) -> Result<Self> {
        let nul = data
            .iter()
            .position(|&b| b == 0)
            .context("Object header is not NUL-terminated")?;

        let header = std::str::from_utf8(&data[..nul]).context("Object header is not UTF-8")?;
        let (kind, size) = header
            .split_once(' ')
            .with_context(|| format!("Malformed object header: {header:?}"))?;
        let kind = ObjectType::try_from(kind)?;
        let size = size
            .parse::<usize>()
            .with_context(|| format!("Malformed object size: {size:?}"))?;

        let payload = data.slice(nul + 1..);
        if payload.len() != size {
            anyhow::bail!(
                "Object size mismatch: header says {size}, payload has {}",
                payload.len()
            );
        }

        Ok(RawObject {
            kind,
            size,
            payload,
        })
    }
}

pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}

impl ObjectBox {
    pub fn from_raw(raw: RawObject) -> Result<Self> {
        Ok(match raw.kind {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(raw.payload)?)),
            ObjectType::Tree => ObjectBox::Tree(Box::new(Tree::deserialize(raw.payload)?)),
            ObjectType::Commit => ObjectBox::Commit(Box::new(Commit::deserialize(raw.payload)?)),
        })
    }

    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
        }
    }
}
