//! # frame_diff
//!
//! Pure frame-differencing engine over [`leap_frame`] snapshots.
//!
//! Given the new frame and the previous one, [`diff`] computes which tracked
//! entities were lost, found, or updated, and which gesture observations are
//! worth dispatching.  The result is a [`FrameDelta`] of independently-owned
//! event values — nothing in the delta aliases back into either snapshot.
//!
//! ## Ordering contract
//!
//! Consumers may rely on the delta's list order:
//!
//! | List       | Order                                            |
//! |------------|--------------------------------------------------|
//! | `lost`     | old hands, then old pointables, in sensor order  |
//! | `found`    | new hands, then new pointables, in sensor order  |
//! | `updated`  | new hands, then new pointables, in sensor order  |
//! | `gestures` | new frame's observation order                    |
//!
//! A dispatcher that publishes the lists in struct-field order therefore
//! guarantees "no lost event for an id arrives after a found event for it
//! within the same tick".
//!
//! ## Pass independence
//!
//! The four passes share no intermediate state: each one re-derives validity
//! with its own id-indexed lookups.  An event appears in a list if and only
//! if that list's predicate holds over the two snapshots — which is what the
//! property tests below check, each direction separately.

use leap_frame::{
    EntityId, EntityKind, EntitySet, FrameSnapshot, GestureObservation, TrackedEntity,
};

// ════════════════════════════════════════════════════════════════════════════
// FrameDelta
// ════════════════════════════════════════════════════════════════════════════

/// A lost entity.  The entity itself is gone from the new frame, so only its
/// identity survives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LostEntity {
    pub kind: EntityKind,
    pub id:   EntityId,
}

/// Everything one tick of frame differencing produced, in dispatch order.
#[derive(Clone, Debug, Default)]
pub struct FrameDelta {
    /// Valid in the old frame, no valid same-id entity in the new frame.
    pub lost:     Vec<LostEntity>,
    /// Valid in the new frame, no valid same-id entity in the old frame.
    pub found:    Vec<TrackedEntity>,
    /// Valid in both frames under the same id.  Exactly one of found/updated
    /// holds for any valid new-frame entity.
    pub updated:  Vec<TrackedEntity>,
    /// The new frame's reportable gesture observations, in frame order.
    pub gestures: Vec<GestureObservation>,
}

impl FrameDelta {
    pub fn is_empty(&self) -> bool {
        self.lost.is_empty()
            && self.found.is_empty()
            && self.updated.is_empty()
            && self.gestures.is_empty()
    }

    /// Total event count across all four lists.
    pub fn len(&self) -> usize {
        self.lost.len() + self.found.len() + self.updated.len() + self.gestures.len()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// diff — the four passes
// ════════════════════════════════════════════════════════════════════════════

/// Compare `new` against `old` and produce the tick's events.
///
/// Pure and linear in the entity counts of the iterated frame: every
/// cross-frame check is an id-indexed lookup into the other snapshot.
pub fn diff(new: &FrameSnapshot, old: &FrameSnapshot) -> FrameDelta {
    FrameDelta {
        lost:     collect_lost(new, old),
        found:    collect_found(new, old),
        updated:  collect_updated(new, old),
        gestures: collect_gestures(new),
    }
}

/// Hands then pointables of the old frame that have no valid successor.
fn collect_lost(new: &FrameSnapshot, old: &FrameSnapshot) -> Vec<LostEntity> {
    let mut lost = Vec::new();
    lost_in(old.hands(), new.hands(), &mut lost);
    lost_in(old.pointables(), new.pointables(), &mut lost);
    lost
}

fn lost_in(old: &EntitySet, new: &EntitySet, out: &mut Vec<LostEntity>) {
    for e in old.iter() {
        if !e.valid {
            continue;
        }
        if !new.contains_valid(e.id) {
            out.push(LostEntity { kind: e.kind, id: e.id });
        }
    }
}

/// Hands then pointables of the new frame that have no valid predecessor.
fn collect_found(new: &FrameSnapshot, old: &FrameSnapshot) -> Vec<TrackedEntity> {
    let mut found = Vec::new();
    present_without_match(new.hands(), old.hands(), &mut found);
    present_without_match(new.pointables(), old.pointables(), &mut found);
    found
}

fn present_without_match(new: &EntitySet, old: &EntitySet, out: &mut Vec<TrackedEntity>) {
    for e in new.iter() {
        if !e.valid {
            continue;
        }
        if !old.contains_valid(e.id) {
            out.push(*e);
        }
    }
}

/// Hands then pointables of the new frame whose id was already valid.
fn collect_updated(new: &FrameSnapshot, old: &FrameSnapshot) -> Vec<TrackedEntity> {
    let mut updated = Vec::new();
    present_with_match(new.hands(), old.hands(), &mut updated);
    present_with_match(new.pointables(), old.pointables(), &mut updated);
    updated
}

fn present_with_match(new: &EntitySet, old: &EntitySet, out: &mut Vec<TrackedEntity>) {
    for e in new.iter() {
        if !e.valid {
            continue;
        }
        if old.contains_valid(e.id) {
            out.push(*e);
        }
    }
}

/// The new frame's observations, minus anything unclassified or flagged
/// invalid.  Routing downstream is strictly by kind — lifecycle `state` is
/// forwarded for subscribers to interpret.
fn collect_gestures(new: &FrameSnapshot) -> Vec<GestureObservation> {
    new.gestures()
        .iter()
        .filter(|g| g.is_reportable())
        .copied()
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
