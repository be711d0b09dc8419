//! Working tree status
//!
//! Tracked entries are compared against the working files through the diff
//! collaborator; files absent from the index are reported as untracked.

pub mod status_report;
