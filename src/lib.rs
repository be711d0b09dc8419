//! sprig: a miniature content-addressed version control engine
//!
//! - `areas`: Stores bound to a repository root (objects, index, refs, working tree)
//! - `artifacts`: Data types and algorithms (object codecs, index format, diff, merge)
//! - `commands`: Plumbing and porcelain commands as `impl Repository` blocks
//! - `config`: Identity file and environment settings
//! - `errors`: Named failures and their exit statuses

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod errors;
