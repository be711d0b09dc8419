//! Command implementations
//!
//! Every command is an `impl Repository` block in its own file:
//!
//! - `plumbing`: Direct access to objects and the index (cat-file, hash-object,
//!   update-cache, write-tree, commit-tree, rm)
//! - `porcelain`: Version control workflows (init, log, branch, checkout, status,
//!   merge, diff)
//!
//! Commands report to the repository's writer and return the first error they hit;
//! nothing is rolled back.

pub mod plumbing;
pub mod porcelain;
