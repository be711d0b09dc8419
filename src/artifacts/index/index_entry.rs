//! Index entry representation
//!
//! Each entry in the index represents a staged path with:
//! - Path relative to the repository root (`/`-separated, the unique key)
//! - File mode as reported by the filesystem (0 for entries restored by checkout)
//! - Object kind tag (blob or tree)
//! - Object ID
//!
//! ## Entry Format
//!
//! ```text
//! u32  entry length (bytes that follow)
//! u32  mode
//! u8   kind tag
//! [20] binary object id
//! u16  path length
//! ...  path bytes
//! ```

use crate::artifacts::index::ENTRY_FIXED_SIZE;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use byteorder::{ByteOrder, NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

/// Longest path that fits the u16 length prefix
pub const MAX_PATH_SIZE: usize = u16::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    pub path: String,
    pub mode: u32,
    pub kind: ObjectType,
    pub oid: ObjectId,
}

impl IndexEntry {
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Size of the serialized entry including its length prefix
    pub fn encoded_len(&self) -> usize {
        4 + ENTRY_FIXED_SIZE + self.path.len()
    }
}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.path.cmp(&other.path)
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        if self.path.len() > MAX_PATH_SIZE {
            anyhow::bail!("Index path too long: {} bytes", self.path.len());
        }

        let mut entry_bytes = Vec::with_capacity(self.encoded_len());
        entry_bytes.write_u32::<NetworkEndian>((ENTRY_FIXED_SIZE + self.path.len()) as u32)?;
        entry_bytes.write_u32::<NetworkEndian>(self.mode)?;
        entry_bytes.write_u8(self.kind.as_u8())?;
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<NetworkEndian>(self.path.len() as u16)?;
        entry_bytes.write_all(self.path.as_bytes())?;

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    /// Decode an entry body, i.e. the bytes after the length prefix
    fn deserialize(body: Bytes) -> anyhow::Result<Self> {
        if body.len() < ENTRY_FIXED_SIZE {
            anyhow::bail!("Index entry too short: {} bytes", body.len());
        }

        let mode = NetworkEndian::read_u32(&body[0..4]);
        let kind = ObjectType::from_u8(body[4])?;
        let oid = ObjectId::read_h40_from(&mut std::io::Cursor::new(&body[5..25]))?;
        let path_len = NetworkEndian::read_u16(&body[25..27]) as usize;

        let path_bytes = body
            .get(ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + path_len)
            .context("Index entry path is truncated")?;
        if ENTRY_FIXED_SIZE + path_len != body.len() {
            let trailing = body.len() - ENTRY_FIXED_SIZE - path_len;
            anyhow::bail!("Index entry has {trailing} trailing bytes");
        }
        let path = String::from_utf8(path_bytes.to_vec()).context("Invalid UTF-8 in entry path")?;

        Ok(IndexEntry {
            path,
            mode,
            kind,
            oid,
        })
    }
}
