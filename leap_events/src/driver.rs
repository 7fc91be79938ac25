//! The polling driver.
//!
//! A [`Tracker`] owns one device session, the previous frame snapshot, and
//! the event bus.  It is not a scheduler: each call to [`Tracker::step`] is
//! one tick, and cadence comes from whatever external source is stepping it
//! (the monitor's frame loop, or a fixed-interval loop — see
//! [`crate::config::SteppingMode`]).
//!
//! Only one tracker session may be live per process.  A second
//! [`Tracker::connect`] while one is live is reported at warning level and
//! discarded — the pre-existing session wins.  Dropping the tracker
//! disconnects the session and frees the slot.

use std::sync::atomic::{AtomicBool, Ordering};

use frame_diff::diff;
use leap_frame::{FrameSnapshot, GestureKind};

use crate::bus::EventBus;
use crate::config::TrackerConfig;
use crate::session::DeviceSession;

/// Process-wide live-session slot.
static SESSION_LIVE: AtomicBool = AtomicBool::new(false);

// ════════════════════════════════════════════════════════════════════════════
// Tracker
// ════════════════════════════════════════════════════════════════════════════

pub struct Tracker {
    session:  Box<dyn DeviceSession>,
    previous: FrameSnapshot,
    bus:      EventBus,
    config:   TrackerConfig,
}

impl Tracker {
    /// Claim the live-session slot and set up the device.
    ///
    /// All four gesture kinds are enabled on the session here; without that
    /// the device would never report any observations.
    pub fn connect(
        mut session: Box<dyn DeviceSession>,
        config: TrackerConfig,
    ) -> Result<Tracker, String> {
        if SESSION_LIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            eprintln!("[tracker] a session is already live — discarding duplicate init");
            return Err("a tracker session is already live".to_string());
        }

        for kind in GestureKind::all() {
            session.enable_gesture_type(kind);
        }

        Ok(Tracker {
            session,
            previous: FrameSnapshot::invalid(),
            bus: EventBus::new(),
            config,
        })
    }

    /// The subscription surface.  Subscribers registered here receive this
    /// tracker's events on every subsequent tick.
    pub fn bus(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The latest published snapshot, for collaborators that poll instead of
    /// subscribing.  Before the first successful tick this is the invalid
    /// sentinel.
    pub fn current_frame(&self) -> &FrameSnapshot {
        &self.previous
    }

    /// One tick: poll, diff against the previous snapshot, publish, swap.
    ///
    /// If the device is unavailable the tick is skipped entirely — no
    /// events, previous snapshot untouched.  A frame with the same id as the
    /// previous one is also skipped: reprocessing it could only emit
    /// no-change updated events.
    ///
    /// Dispatch is synchronous; the tick does not finish until every
    /// subscriber has run.  Subscribers must not try to step the tracker
    /// from inside a callback — the bus lives inside the tracker, so no
    /// callback can hold the tracker mutably anyway.
    pub fn step(&mut self) {
        let new = match self.session.poll_snapshot() {
            Some(frame) => frame,
            None => return,
        };

        if new.frame_id() == self.previous.frame_id() {
            return;
        }

        let delta = diff(&new, &self.previous);
        self.bus.publish_delta(&delta);
        self.previous = new;
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.session.disconnect();
        SESSION_LIVE.store(false, Ordering::SeqCst);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ScriptedSession;
    use leap_frame::{EntityId, TrackedEntity, Vec3};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::{Mutex, MutexGuard};

    // The live-session slot is process-wide, so tracker tests take turns.
    static SLOT: Mutex<()> = Mutex::new(());

    fn slot() -> MutexGuard<'static, ()> {
        SLOT.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn hand_frame(frame_id: i64, hand_ids: &[EntityId]) -> FrameSnapshot {
        FrameSnapshot::new(
            frame_id,
            hand_ids.iter().map(|&id| TrackedEntity::hand(id, Vec3::ZERO)).collect(),
            Vec::new(),
            Vec::new(),
        )
    }

    fn tracker_over(polls: Vec<Option<FrameSnapshot>>) -> Tracker {
        Tracker::connect(Box::new(ScriptedSession::new(polls)), TrackerConfig::default())
            .expect("slot should be free")
    }

    #[test]
    fn connect_enables_all_four_gesture_kinds() {
        let _guard = slot();
        let session = ScriptedSession::new(Vec::new());
        let log = session.enabled_log();

        let _tracker = Tracker::connect(Box::new(session), TrackerConfig::default()).unwrap();
        assert_eq!(*log.borrow(), GestureKind::all().to_vec());
    }

    #[test]
    fn first_tick_reports_everything_found() {
        let _guard = slot();
        let mut tracker = tracker_over(vec![Some(hand_frame(1, &[7]))]);

        let found = Rc::new(RefCell::new(Vec::new()));
        let f = found.clone();
        tracker.bus().on_hand_found(move |e| f.borrow_mut().push(e.id));

        tracker.step();
        assert_eq!(*found.borrow(), vec![7]);
        assert_eq!(tracker.current_frame().frame_id(), 1);
    }

    #[test]
    fn second_tick_reports_survivor_updated() {
        let _guard = slot();
        let mut tracker = tracker_over(vec![
            Some(hand_frame(1, &[7])),
            Some(hand_frame(2, &[7])),
        ]);

        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        tracker.bus().on_hand_found(move |e| l.borrow_mut().push(("found", e.id)));
        let l = log.clone();
        tracker.bus().on_hand_updated(move |e| l.borrow_mut().push(("updated", e.id)));

        tracker.step();
        tracker.step();
        assert_eq!(*log.borrow(), vec![("found", 7), ("updated", 7)]);
    }

    #[test]
    fn unavailable_device_skips_the_tick() {
        let _guard = slot();
        let mut tracker = tracker_over(vec![
            Some(hand_frame(1, &[7])),
            None,
            Some(hand_frame(2, &[])),
        ]);

        let events = Rc::new(RefCell::new(0));
        let e = events.clone();
        tracker.bus().on_hand_found(move |_| *e.borrow_mut() += 1);
        let e = events.clone();
        tracker.bus().on_hand_lost(move |_| *e.borrow_mut() += 1);

        tracker.step();
        assert_eq!(*events.borrow(), 1);

        // Unavailable: zero events, previous snapshot unchanged.
        tracker.step();
        assert_eq!(*events.borrow(), 1);
        assert_eq!(tracker.current_frame().frame_id(), 1);

        // The device coming back diffs against the retained frame.
        tracker.step();
        assert_eq!(*events.borrow(), 2);
        assert_eq!(tracker.current_frame().frame_id(), 2);
    }

    #[test]
    fn unchanged_frame_id_is_skipped() {
        let _guard = slot();
        let mut tracker = tracker_over(vec![
            Some(hand_frame(1, &[7])),
            Some(hand_frame(1, &[7])),
        ]);

        let updates = Rc::new(RefCell::new(0));
        let u = updates.clone();
        tracker.bus().on_hand_updated(move |_| *u.borrow_mut() += 1);

        tracker.step();
        tracker.step();
        assert_eq!(*updates.borrow(), 0);
    }

    #[test]
    fn one_tick_delivers_categories_in_fixed_order() {
        let _guard = slot();
        use leap_frame::{GestureKind, GestureObservation, GestureState};

        // Old frame: hand 1, pointable 2.  New frame: hand 1 persists,
        // pointable 2 gone, hand 3 new, plus a key tap.
        let old = FrameSnapshot::new(
            1,
            vec![TrackedEntity::hand(1, Vec3::ZERO)],
            vec![TrackedEntity::pointable(2, Vec3::ZERO)],
            Vec::new(),
        );
        let new = FrameSnapshot::new(
            2,
            vec![TrackedEntity::hand(1, Vec3::ZERO), TrackedEntity::hand(3, Vec3::ZERO)],
            Vec::new(),
            vec![GestureObservation::new(9, GestureKind::KeyTap, GestureState::Stop, 2)],
        );
        let mut tracker = tracker_over(vec![Some(old), Some(new)]);

        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        tracker.bus().on_pointable_lost(move |id| l.borrow_mut().push(format!("lost:{}", id)));
        let l = log.clone();
        tracker.bus().on_hand_found(move |e| l.borrow_mut().push(format!("found:{}", e.id)));
        let l = log.clone();
        tracker.bus().on_hand_updated(move |e| l.borrow_mut().push(format!("updated:{}", e.id)));
        let l = log.clone();
        tracker.bus().on_key_tap(move |g| l.borrow_mut().push(format!("tap:{}", g.id)));

        tracker.step();
        log.borrow_mut().clear();
        tracker.step();

        assert_eq!(
            *log.borrow(),
            vec!["lost:2", "found:3", "updated:1", "tap:9"]
        );
    }

    #[test]
    fn duplicate_connect_is_discarded_until_teardown() {
        let _guard = slot();
        let first = tracker_over(Vec::new());

        let second = Tracker::connect(
            Box::new(ScriptedSession::new(Vec::new())),
            TrackerConfig::default(),
        );
        assert!(second.is_err());

        drop(first);

        let third = Tracker::connect(
            Box::new(ScriptedSession::new(Vec::new())),
            TrackerConfig::default(),
        );
        assert!(third.is_ok());
    }
}
