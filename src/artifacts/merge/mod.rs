//! Merge planning
//!
//! - `ancestry`: first-parent ancestry chains and common-ancestor selection
//! - `reconcile`: per-path decision of how the two tips are combined

pub mod ancestry;
pub mod reconcile;
