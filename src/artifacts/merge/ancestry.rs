//! First-parent ancestry
//!
//! Only the first parent of each commit is followed, so a merge commit contributes
//! the branch it was made on. The common ancestor is the first commit of the current
//! chain that also appears in the target chain: exact for linear histories, not a
//! general lowest common ancestor for merge-of-merge graphs.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashSet;

/// The tip followed by its first-parent ancestors, newest first
pub fn ancestry_chain(database: &Database, tip: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(tip.clone());

    while let Some(oid) = current {
        if !seen.insert(oid.clone()) {
            tracing::warn!(%oid, "commit history loops back on itself, stopping");
            break;
        }

        current = database.parse_commit(&oid)?.parent().cloned();
        chain.push(oid);
    }

    Ok(chain)
}

/// First commit of `current` that `target` also contains
pub fn common_ancestor(current: &[ObjectId], target: &[ObjectId]) -> Option<ObjectId> {
    let target = target.iter().collect::<HashSet<_>>();

    current.iter().find(|oid| target.contains(oid)).cloned()
}

/// Whether moving `current_tip` to the target is a fast-forward
pub fn is_fast_forward(current_tip: &ObjectId, target_chain: &[ObjectId]) -> bool {
    target_chain.contains(current_tip)
}
