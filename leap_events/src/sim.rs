//! Keyboard-driven device simulation.
//!
//! The monitor window translates key presses into [`SimInput`]s and sends
//! them over a channel; [`SimDevice`] folds them into an evolving synthetic
//! scene and serves it as frame snapshots.  The rest of the pipeline cannot
//! tell it apart from hardware, so the whole event engine runs without a
//! sensor attached.
//!
//! Tap inputs become one-shot observations with state `Stop`, the way the
//! sensor reports discrete taps.  Swipe and circle inputs are held: pressing
//! starts the gesture (`Start`), holding streams `Update` observations, and
//! releasing ends it (`Stop`) — all three under one stable gesture id.

use std::sync::mpsc::Receiver;

use leap_frame::{
    EntityId, FrameId, FrameSnapshot, GestureKind, GestureObservation, GestureState,
    TrackedEntity, Vec3,
};

use crate::session::DeviceSession;

// ════════════════════════════════════════════════════════════════════════════
// SimInput — raw input events from the monitor window
// ════════════════════════════════════════════════════════════════════════════

/// One simulated input, as translated from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Toggle presence of hand 0 or hand 1.
    ToggleHand(usize),
    /// Toggle the index-finger pointable on hand 0.
    ToggleFinger,
    /// Move all present entities by (dx, dy) device millimetres.
    Nudge(f32, f32),
    /// Discrete key-tap observation.
    KeyTap,
    /// Discrete screen-tap observation.
    ScreenTap,
    /// Swipe key pressed (true) or released (false).
    SwipeHeld(bool),
    /// Circle key pressed (true) or released (false).
    CircleHeld(bool),
    /// Device dropout key pressed (true) or released (false); while held the
    /// device reports unavailable.
    DropoutHeld(bool),
}

// ════════════════════════════════════════════════════════════════════════════
// SimDevice
// ════════════════════════════════════════════════════════════════════════════

/// Rest positions for the two simulated hands (device mm).
const HAND_REST: [Vec3; 2] = [
    Vec3 { x: -80.0, y: 200.0, z: 0.0 },
    Vec3 { x: 80.0, y: 200.0, z: 0.0 },
];

/// Fingertip offset from the owning palm.
const FINGER_OFFSET: Vec3 = Vec3 { x: 10.0, y: 45.0, z: -15.0 };

struct SimHand {
    id:       EntityId,
    position: Vec3,
    velocity: Vec3,
}

/// A held swipe or circle in progress.
struct HeldGesture {
    id:      EntityId,
    kind:    GestureKind,
    origin:  Vec3,
    /// Next state to report: `Start` on the first frame after the press,
    /// `Update` afterwards, `Stop` once the key is released.
    next:    GestureState,
}

/// Synthetic device session driven by [`SimInput`]s.
pub struct SimDevice {
    inputs:    Receiver<SimInput>,
    frame_id:  FrameId,
    next_id:   EntityId,

    hands:     [Option<SimHand>; 2],
    finger:    Option<SimHand>,

    taps:      Vec<GestureObservation>,
    held:      Vec<HeldGesture>,
    dropout:   bool,
    enabled:   Vec<GestureKind>,
}

impl SimDevice {
    pub fn new(inputs: Receiver<SimInput>) -> Self {
        SimDevice {
            inputs,
            frame_id: 0,
            next_id:  1,
            hands:    [None, None],
            finger:   None,
            taps:     Vec::new(),
            held:     Vec::new(),
            dropout:  false,
            enabled:  Vec::new(),
        }
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::ToggleHand(slot) if slot < 2 => {
                if self.hands[slot].is_some() {
                    self.hands[slot] = None;
                    if slot == 0 {
                        // The finger rides hand 0; losing the hand loses it.
                        self.finger = None;
                    }
                } else {
                    let id = self.alloc_id();
                    self.hands[slot] = Some(SimHand {
                        id,
                        position: HAND_REST[slot],
                        velocity: Vec3::ZERO,
                    });
                }
            }
            SimInput::ToggleHand(_) => {}

            SimInput::ToggleFinger => {
                if self.finger.is_some() {
                    self.finger = None;
                } else if let Some(hand) = &self.hands[0] {
                    let position = Vec3::new(
                        hand.position.x + FINGER_OFFSET.x,
                        hand.position.y + FINGER_OFFSET.y,
                        hand.position.z + FINGER_OFFSET.z,
                    );
                    let id = self.alloc_id();
                    self.finger = Some(SimHand { id, position, velocity: Vec3::ZERO });
                }
            }

            SimInput::Nudge(dx, dy) => {
                for hand in self.hands.iter_mut().flatten() {
                    hand.position.x += dx;
                    hand.position.y += dy;
                    hand.velocity = Vec3::new(dx * 60.0, dy * 60.0, 0.0);
                }
                if let Some(finger) = &mut self.finger {
                    finger.position.x += dx;
                    finger.position.y += dy;
                    finger.velocity = Vec3::new(dx * 60.0, dy * 60.0, 0.0);
                }
            }

            SimInput::KeyTap    => self.queue_tap(GestureKind::KeyTap),
            SimInput::ScreenTap => self.queue_tap(GestureKind::ScreenTap),

            SimInput::SwipeHeld(down)  => self.set_held(GestureKind::Swipe, down),
            SimInput::CircleHeld(down) => self.set_held(GestureKind::Circle, down),

            SimInput::DropoutHeld(down) => self.dropout = down,
        }
    }

    fn queue_tap(&mut self, kind: GestureKind) {
        let origin = self.gesture_origin();
        let id = self.alloc_id();
        let mut obs = GestureObservation::new(id, kind, GestureState::Stop, 0);
        obs.start_position = origin;
        obs.position = origin;
        self.taps.push(obs);
    }

    fn set_held(&mut self, kind: GestureKind, down: bool) {
        if down {
            if self.held.iter().any(|g| g.kind == kind) {
                return;
            }
            let origin = self.gesture_origin();
            let id = self.alloc_id();
            self.held.push(HeldGesture { id, kind, origin, next: GestureState::Start });
        } else if let Some(g) = self.held.iter_mut().find(|g| g.kind == kind) {
            g.next = GestureState::Stop;
        }
    }

    /// Gestures originate at hand 0's palm if present, else mid-air.
    fn gesture_origin(&self) -> Vec3 {
        self.hands[0]
            .as_ref()
            .map(|h| h.position)
            .unwrap_or(Vec3::new(0.0, 220.0, 0.0))
    }

    fn gesture_enabled(&self, kind: GestureKind) -> bool {
        self.enabled.contains(&kind)
    }

    /// Assemble this frame's observations and advance gesture lifecycles.
    fn collect_gestures(&mut self, frame_id: FrameId) -> Vec<GestureObservation> {
        let mut out = Vec::new();

        for mut obs in self.taps.drain(..) {
            obs.frame_id = frame_id;
            out.push(obs);
        }

        let origin_now = self.gesture_origin();
        let mut finished = Vec::new();
        for g in self.held.iter_mut() {
            let mut obs = GestureObservation::new(g.id, g.kind, g.next, frame_id);
            obs.start_position = g.origin;
            obs.position = origin_now;
            out.push(obs);

            match g.next {
                GestureState::Start => g.next = GestureState::Update,
                GestureState::Stop  => finished.push(g.id),
                _ => {}
            }
        }
        self.held.retain(|g| !finished.contains(&g.id));

        out.retain(|obs| self.enabled.contains(&obs.kind));
        out
    }
}

impl DeviceSession for SimDevice {
    fn poll_snapshot(&mut self) -> Option<FrameSnapshot> {
        // Drain window input accumulated since the last tick.
        while let Ok(input) = self.inputs.try_recv() {
            self.apply(input);
        }

        if self.dropout {
            return None;
        }

        self.frame_id += 1;
        let frame_id = self.frame_id;

        let hands: Vec<TrackedEntity> = self
            .hands
            .iter()
            .flatten()
            .map(|h| {
                let mut e = TrackedEntity::hand(h.id, h.position);
                e.velocity = h.velocity;
                e
            })
            .collect();

        let pointables: Vec<TrackedEntity> = self
            .finger
            .iter()
            .map(|f| {
                let mut e = TrackedEntity::pointable(f.id, f.position);
                e.velocity = f.velocity;
                e
            })
            .collect();

        let gestures = self.collect_gestures(frame_id);

        Some(FrameSnapshot::new(frame_id, hands, pointables, gestures))
    }

    fn enable_gesture_type(&mut self, kind: GestureKind) {
        if !self.gesture_enabled(kind) {
            self.enabled.push(kind);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, Sender};

    fn device() -> (Sender<SimInput>, SimDevice) {
        let (tx, rx) = mpsc::channel();
        let mut dev = SimDevice::new(rx);
        for kind in GestureKind::all() {
            dev.enable_gesture_type(kind);
        }
        (tx, dev)
    }

    #[test]
    fn frame_ids_increase_monotonically() {
        let (_tx, mut dev) = device();
        let a = dev.poll_snapshot().unwrap().frame_id();
        let b = dev.poll_snapshot().unwrap().frame_id();
        assert!(b > a);
    }

    #[test]
    fn toggling_a_hand_adds_then_removes_it() {
        let (tx, mut dev) = device();

        tx.send(SimInput::ToggleHand(0)).unwrap();
        let snap = dev.poll_snapshot().unwrap();
        assert_eq!(snap.hands().len(), 1);
        assert!(snap.hands().iter().all(|h| h.valid));

        tx.send(SimInput::ToggleHand(0)).unwrap();
        let snap = dev.poll_snapshot().unwrap();
        assert!(snap.hands().is_empty());
    }

    #[test]
    fn retoggled_hand_gets_a_fresh_id() {
        let (tx, mut dev) = device();

        tx.send(SimInput::ToggleHand(0)).unwrap();
        let first = dev.poll_snapshot().unwrap().hands().iter().next().unwrap().id;

        tx.send(SimInput::ToggleHand(0)).unwrap();
        dev.poll_snapshot().unwrap();

        tx.send(SimInput::ToggleHand(0)).unwrap();
        let second = dev.poll_snapshot().unwrap().hands().iter().next().unwrap().id;

        assert_ne!(first, second);
    }

    #[test]
    fn finger_requires_hand_zero_and_follows_removal() {
        let (tx, mut dev) = device();

        // No hand: the toggle is ignored.
        tx.send(SimInput::ToggleFinger).unwrap();
        assert!(dev.poll_snapshot().unwrap().pointables().is_empty());

        tx.send(SimInput::ToggleHand(0)).unwrap();
        tx.send(SimInput::ToggleFinger).unwrap();
        assert_eq!(dev.poll_snapshot().unwrap().pointables().len(), 1);

        // Removing the hand removes its finger too.
        tx.send(SimInput::ToggleHand(0)).unwrap();
        let snap = dev.poll_snapshot().unwrap();
        assert!(snap.hands().is_empty());
        assert!(snap.pointables().is_empty());
    }

    #[test]
    fn tap_fires_exactly_once() {
        let (tx, mut dev) = device();

        tx.send(SimInput::KeyTap).unwrap();
        let snap = dev.poll_snapshot().unwrap();
        assert_eq!(snap.gestures().len(), 1);
        assert_eq!(snap.gestures()[0].kind, GestureKind::KeyTap);
        assert_eq!(snap.gestures()[0].state, GestureState::Stop);
        assert_eq!(snap.gestures()[0].frame_id, snap.frame_id());

        assert!(dev.poll_snapshot().unwrap().gestures().is_empty());
    }

    #[test]
    fn held_swipe_runs_start_update_stop_under_one_id() {
        let (tx, mut dev) = device();

        tx.send(SimInput::SwipeHeld(true)).unwrap();
        let s1 = dev.poll_snapshot().unwrap();
        assert_eq!(s1.gestures()[0].state, GestureState::Start);
        let id = s1.gestures()[0].id;

        let s2 = dev.poll_snapshot().unwrap();
        assert_eq!(s2.gestures()[0].state, GestureState::Update);
        assert_eq!(s2.gestures()[0].id, id);

        tx.send(SimInput::SwipeHeld(false)).unwrap();
        let s3 = dev.poll_snapshot().unwrap();
        assert_eq!(s3.gestures()[0].state, GestureState::Stop);
        assert_eq!(s3.gestures()[0].id, id);

        assert!(dev.poll_snapshot().unwrap().gestures().is_empty());
    }

    #[test]
    fn disabled_kinds_are_never_reported() {
        let (tx, rx) = mpsc::channel();
        let mut dev = SimDevice::new(rx);
        dev.enable_gesture_type(GestureKind::KeyTap);

        tx.send(SimInput::ScreenTap).unwrap();
        tx.send(SimInput::KeyTap).unwrap();
        let snap = dev.poll_snapshot().unwrap();

        assert_eq!(snap.gestures().len(), 1);
        assert_eq!(snap.gestures()[0].kind, GestureKind::KeyTap);
    }

    #[test]
    fn dropout_makes_the_device_unavailable_until_released() {
        let (tx, mut dev) = device();

        tx.send(SimInput::DropoutHeld(true)).unwrap();
        assert!(dev.poll_snapshot().is_none());
        assert!(dev.poll_snapshot().is_none());

        tx.send(SimInput::DropoutHeld(false)).unwrap();
        assert!(dev.poll_snapshot().is_some());
    }

    #[test]
    fn nudge_moves_hand_and_finger_together() {
        let (tx, mut dev) = device();

        tx.send(SimInput::ToggleHand(0)).unwrap();
        tx.send(SimInput::ToggleFinger).unwrap();
        let before = dev.poll_snapshot().unwrap();
        let hand_x = before.hands().iter().next().unwrap().position.x;
        let finger_x = before.pointables().iter().next().unwrap().position.x;

        tx.send(SimInput::Nudge(12.0, -4.0)).unwrap();
        let after = dev.poll_snapshot().unwrap();
        let hand = after.hands().iter().next().unwrap();
        let finger = after.pointables().iter().next().unwrap();

        assert_eq!(hand.position.x, hand_x + 12.0);
        assert_eq!(finger.position.x, finger_x + 12.0);
        assert!(hand.velocity.x > 0.0);
    }
}
