//! Walks two consecutive frames through the differ and prints the delta.

use frame_diff::diff;
use leap_frame::{
    FrameSnapshot, GestureKind, GestureObservation, GestureState, TrackedEntity, Vec3,
};

fn show(delta: &frame_diff::FrameDelta) {
    for l in &delta.lost {
        println!("   lost     {} #{}", l.kind.name(), l.id);
    }
    for e in &delta.found {
        println!("   found    {} #{}  at ({:.0}, {:.0}, {:.0})",
                 e.kind.name(), e.id, e.position.x, e.position.y, e.position.z);
    }
    for e in &delta.updated {
        println!("   updated  {} #{}  at ({:.0}, {:.0}, {:.0})",
                 e.kind.name(), e.id, e.position.x, e.position.y, e.position.z);
    }
    for g in &delta.gestures {
        println!("   gesture  {} #{}  ({})", g.kind.name(), g.id, g.state.name());
    }
    if delta.is_empty() {
        println!("   (no events)");
    }
}

fn main() {
    println!("\n=== Frame Differencing Demo ===\n");

    // ── 1. First frame against the sentinel: everything is found ─────────
    println!("1. First frame (hand #1, fingers #10, #11)");
    let f1 = FrameSnapshot::new(
        1,
        vec![TrackedEntity::hand(1, Vec3::new(0.0, 200.0, 0.0))],
        vec![
            TrackedEntity::pointable(10, Vec3::new(-30.0, 230.0, 0.0)),
            TrackedEntity::pointable(11, Vec3::new(30.0, 230.0, 0.0)),
        ],
        Vec::new(),
    );
    show(&diff(&f1, &FrameSnapshot::invalid()));
    println!();

    // ── 2. Hand moves, one finger curls away, a new one appears ──────────
    println!("2. Second frame (hand #1 moved, finger #11 gone, finger #12 new)");
    let f2 = FrameSnapshot::new(
        2,
        vec![TrackedEntity::hand(1, Vec3::new(15.0, 205.0, -10.0))],
        vec![
            TrackedEntity::pointable(10, Vec3::new(-25.0, 235.0, -10.0)),
            TrackedEntity::pointable(12, Vec3::new(45.0, 228.0, -10.0)),
        ],
        Vec::new(),
    );
    show(&diff(&f2, &f1));
    println!();

    // ── 3. A key tap fires; an unclassified observation rides along ──────
    println!("3. Third frame (key tap #5; one unclassified observation dropped)");
    let f3 = FrameSnapshot::new(
        3,
        vec![TrackedEntity::hand(1, Vec3::new(15.0, 205.0, -10.0))],
        vec![TrackedEntity::pointable(10, Vec3::new(-25.0, 235.0, -10.0))],
        vec![
            GestureObservation::new(5, GestureKind::KeyTap, GestureState::Stop, 3),
            GestureObservation::new(6, GestureKind::Invalid, GestureState::Stop, 3),
        ],
    );
    show(&diff(&f3, &f2));
    println!();

    // ── 4. Everything disappears ─────────────────────────────────────────
    println!("4. Empty frame: remaining entities are lost");
    let f4 = FrameSnapshot::new(4, Vec::new(), Vec::new(), Vec::new());
    show(&diff(&f4, &f3));
    println!();
}
