//! Stateful stores bound to a repository root
//!
//! - `database`: Object store for blobs, trees and commits
//! - `index`: Staging area
//! - `refs`: Branch refs and HEAD
//! - `repository`: The repository context that ties the stores together
//! - `workspace`: Working directory file system operations

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
