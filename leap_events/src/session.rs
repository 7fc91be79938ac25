//! Device session backends.
//!
//! A [`DeviceSession`] is where frames come from.  The driver does not care
//! whether that is real LeapMotion hardware ([`LeapSession`], behind the
//! `leap` feature), a keyboard-driven simulation ([`crate::sim::SimDevice`]),
//! or a canned script ([`ScriptedSession`]) — it polls one snapshot per tick
//! and treats `None` as "device unavailable, skip this tick".

use std::collections::VecDeque;

use leap_frame::{FrameSnapshot, GestureKind};

// ════════════════════════════════════════════════════════════════════════════
// DeviceSession trait — unified interface for hw, sim, and tests
// ════════════════════════════════════════════════════════════════════════════

/// One connection to a motion-sensing device.
pub trait DeviceSession {
    /// Pull the device's latest frame.  `None` means the device cannot be
    /// polled right now; the caller skips the tick and tries again later.
    fn poll_snapshot(&mut self) -> Option<FrameSnapshot>;

    /// Opt in to a gesture kind.  Must be called for every kind of interest
    /// during setup or the device will never report observations of it.
    fn enable_gesture_type(&mut self, kind: GestureKind);

    /// Release the device.  Called once at teardown.
    fn disconnect(&mut self) {}
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedSession — canned poll results for tests and demos
// ════════════════════════════════════════════════════════════════════════════

/// Serves a fixed sequence of poll results, then reports unavailable.
///
/// `enabled_log` hands out a shared view of the gesture kinds enabled so
/// far, so a test can keep watching after the session moves into a driver.
pub struct ScriptedSession {
    polls:   VecDeque<Option<FrameSnapshot>>,
    enabled: std::rc::Rc<std::cell::RefCell<Vec<GestureKind>>>,
}

impl ScriptedSession {
    pub fn new(polls: Vec<Option<FrameSnapshot>>) -> Self {
        ScriptedSession {
            polls:   polls.into(),
            enabled: Default::default(),
        }
    }

    /// Shared log of `enable_gesture_type` calls, in call order.
    pub fn enabled_log(&self) -> std::rc::Rc<std::cell::RefCell<Vec<GestureKind>>> {
        self.enabled.clone()
    }
}

impl DeviceSession for ScriptedSession {
    fn poll_snapshot(&mut self) -> Option<FrameSnapshot> {
        self.polls.pop_front().flatten()
    }

    fn enable_gesture_type(&mut self, kind: GestureKind) {
        self.enabled.borrow_mut().push(kind);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapSession — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Session backed by a real LeapMotion controller over LeapC.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// LeapC streams raw tracking only — hands and digits, no gesture
/// classification — so this backend records the enabled gesture kinds but
/// its snapshots carry no observations.  Digit pointables get ids derived
/// from hand id and digit index, which is as stable as LeapC tracking
/// continuity itself.
#[cfg(feature = "leap")]
pub struct LeapSession {
    connection: leaprs::Connection,
    enabled:    Vec<GestureKind>,
}

#[cfg(feature = "leap")]
impl LeapSession {
    pub fn connect() -> Result<Self, String> {
        use leaprs::*;

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| format!("failed to create LeapC connection: {:?}", e))?;
        connection
            .open()
            .map_err(|e| format!("failed to open LeapMotion device: {:?}", e))?;
        eprintln!("[session] LeapC connection open");

        Ok(LeapSession {
            connection,
            enabled: Vec::new(),
        })
    }
}

#[cfg(feature = "leap")]
impl DeviceSession for LeapSession {
    fn poll_snapshot(&mut self) -> Option<FrameSnapshot> {
        use leap_frame::{EntityId, FrameId, TrackedEntity, Vec3};
        use leaprs::*;

        let msg = self.connection.poll(10).ok()?;

        if let Event::Tracking(frame) = msg.event() {
            let mut hands      = Vec::new();
            let mut pointables = Vec::new();

            for h in frame.hands() {
                let hand_id = h.id() as EntityId;
                let palm    = h.palm();
                let pos     = palm.position();
                let vel     = palm.velocity();

                let mut hand = TrackedEntity::hand(hand_id, Vec3::new(pos.x, pos.y, pos.z));
                hand.velocity = Vec3::new(vel.x, vel.y, vel.z);
                hands.push(hand);

                for (i, digit) in h.digits().enumerate() {
                    let tip = digit.distal().next_joint();
                    pointables.push(TrackedEntity::pointable(
                        hand_id * 5 + i as EntityId,
                        Vec3::new(tip.x, tip.y, tip.z),
                    ));
                }
            }

            Some(FrameSnapshot::new(
                frame.tracking_frame_id() as FrameId,
                hands,
                pointables,
                Vec::new(),
            ))
        } else {
            None
        }
    }

    fn enable_gesture_type(&mut self, kind: GestureKind) {
        if !self.enabled.contains(&kind) {
            self.enabled.push(kind);
        }
    }

    fn disconnect(&mut self) {
        eprintln!("[session] closing LeapC connection");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
