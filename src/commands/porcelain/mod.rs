//! Porcelain commands
//!
//! - `init`: Create the control directory
//! - `log`: Walk the first-parent history from HEAD
//! - `branch`: Create a branch and switch to it
//! - `checkout`: Replace the working tree and index with a commit's tree
//! - `status`: Report modified, deleted and untracked files
//! - `merge`: Fast-forward or three-way merge another branch
//! - `diff`: Patches between two commits

pub mod branch;
pub mod checkout;
pub mod diff;
pub mod init;
pub mod log;
pub mod merge;
pub mod status;
