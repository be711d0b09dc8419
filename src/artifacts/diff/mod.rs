//! Line-level diff, patch and merge
//!
//! - `myers`: Myers' diff for line-by-line comparison
//! - `hunk`: grouping of an edit script into context hunks
//! - `patch`: unified patch formatting, parsing and application
//! - `diff3`: three-way merge with conflict markers
//! - `tool`: the [`tool::DiffTool`] seam used by status, diff and merge, with the
//!   builtin implementation and an adapter over the host's `diff`/`patch`/`merge`

pub mod diff3;
pub mod hunk;
pub mod myers;
pub mod patch;
pub mod tool;

pub const CONTEXT_LINES: usize = 3;
pub const NULL_PATH: &str = "/dev/null";
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Split content into lines, each keeping its trailing newline
pub fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    content.split_inclusive(|&byte| byte == b'\n').collect()
}
