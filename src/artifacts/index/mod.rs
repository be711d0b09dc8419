//! Index file format
//!
//! The index (staging area) records the paths slated for the next commit.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "SIDX" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length, sorted by path):
//!   - Each entry is length-prefixed
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "SIDX";

/// Index file format version
pub const VERSION: u32 = 1;

/// Mode, kind tag, binary id and path length of an entry body
pub const ENTRY_FIXED_SIZE: usize = 4 + 1 + 20 + 2;
