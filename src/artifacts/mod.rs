//! Data structures and algorithms
//!
//! - `branch`: Branch names and the HEAD pointer
//! - `core`: Shared utilities (pager wrapper)
//! - `diff`: Line diff, unified patches, three-way merge and the diff collaborator
//! - `index`: Index file format
//! - `merge`: Ancestry chains and per-path merge planning
//! - `objects`: Object types (blob, tree, commit)
//! - `status`: Working tree status report

pub mod branch;
pub mod core;
pub mod diff;
pub mod index;
pub mod merge;
pub mod objects;
pub mod status;
