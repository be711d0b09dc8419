//! Plumbing commands
//!
//! - `cat-file`: Print an object's payload, kind or size
//! - `hash-object`: Store a file as a blob and print its id
//! - `update-cache`: Stage files into the index
//! - `write-tree`: Store the index as a tree hierarchy
//! - `commit-tree`: Create a commit from a tree
//! - `rm`: Unstage paths

pub mod cat_file;
pub mod commit_tree;
pub mod hash_object;
pub mod rm;
pub mod update_cache;
pub mod write_tree;
