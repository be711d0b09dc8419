//! Per-path merge decisions
//!
//! Every path of the ancestor and both tips is classified by where it is present and
//! which side changed it relative to the ancestor.

use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::BTreeMap;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Presence: u8 {
        const BASE = 0b001;
        const OURS = 0b010;
        const THEIRS = 0b100;
        const EVERYWHERE = Self::BASE.bits() | Self::OURS.bits() | Self::THEIRS.bits();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Neither tip touched the ancestor's version
    Unchanged,
    /// Both tips changed it: three-way merge against the ancestor
    MergeBoth,
    /// Only the current tip changed it: patch ancestor to current
    PatchOurs,
    /// Only the target tip changed it: patch ancestor to target
    PatchTheirs,
    /// Added by one tip, or added identically by both
    Add(ObjectId),
    /// Added differently by both tips: merge against an empty ancestor
    AddBoth,
    /// Missing from at least one tip
    Deleted,
}

pub fn plan(
    base: &BTreeMap<String, ObjectId>,
    ours: &BTreeMap<String, ObjectId>,
    theirs: &BTreeMap<String, ObjectId>,
) -> BTreeMap<String, Resolution> {
    let paths = base.keys().chain(ours.keys()).chain(theirs.keys());

    paths
        .map(|path| {
            let (b, o, t) = (base.get(path), ours.get(path), theirs.get(path));

            let mut presence = Presence::empty();
            presence.set(Presence::BASE, b.is_some());
            presence.set(Presence::OURS, o.is_some());
            presence.set(Presence::THEIRS, t.is_some());

            (path.clone(), resolve(presence, b, o, t))
        })
        .collect()
}

fn resolve(
    presence: Presence,
    base: Option<&ObjectId>,
    ours: Option<&ObjectId>,
    theirs: Option<&ObjectId>,
) -> Resolution {
    if presence == Presence::EVERYWHERE {
        let ours_changed = ours != base;
        let theirs_changed = theirs != base;

        return match (ours_changed, theirs_changed) {
            (false, false) => Resolution::Unchanged,
            (true, true) => Resolution::MergeBoth,
            (true, false) => Resolution::PatchOurs,
            (false, true) => Resolution::PatchTheirs,
        };
    }

    if presence.contains(Presence::BASE) {
        return Resolution::Deleted;
    }

    match (ours, theirs) {
        (Some(o), Some(t)) if o == t => Resolution::Add(o.clone()),
        (Some(_), Some(_)) => Resolution::AddBoth,
        (Some(added), None) | (None, Some(added)) => Resolution::Add(added.clone()),
        (None, None) => Resolution::Deleted,
    }
}
