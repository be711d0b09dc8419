//! Object model
//!
//! All content is stored as objects identified by SHA-1 hashes. There are three types:
//!
//! - **Blob**: File content (raw bytes)
//! - **Tree**: Directory listing (`<kind> <id> <name>` triples)
//! - **Commit**: Snapshot with metadata (tree, parents, author, committer, message)
//!
//! All objects share the stored format `<type> <size>\0<payload>`, which is hashed
//! before being zlib-compressed.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
