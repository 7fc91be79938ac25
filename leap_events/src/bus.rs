//! Typed publish/subscribe registry for frame lifecycle events.
//!
//! Subscribers register a callback against one event [`Category`] and get a
//! [`Subscription`] handle back.  Publishing invokes every currently
//! registered callback for that category, in registration order,
//! synchronously on the caller's thread.  A callback that panics is isolated
//! and logged; delivery continues with the next subscriber.
//!
//! [`EventBus::publish_delta`] fans out one tick's [`FrameDelta`] in the
//! fixed category order subscribers may rely on: all lost events, then all
//! found, then all updated, then all gestures — hands before pointables
//! within the entity categories, snapshot order within gestures.

use std::panic::{self, AssertUnwindSafe};

use frame_diff::FrameDelta;
use leap_frame::{EntityId, EntityKind, GestureKind, GestureObservation, TrackedEntity};

// ════════════════════════════════════════════════════════════════════════════
// Category and Subscription
// ════════════════════════════════════════════════════════════════════════════

/// The event categories, declared in per-tick delivery order.
///
/// Swipe and circle subscribers receive the raw observation and interpret
/// its lifecycle `state` themselves; the bus routes by gesture kind only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    HandLost,
    PointableLost,
    HandFound,
    PointableFound,
    HandUpdated,
    PointableUpdated,
    KeyTap,
    ScreenTap,
    Swipe,
    Circle,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::HandLost         => "hand lost",
            Category::PointableLost    => "pointable lost",
            Category::HandFound        => "hand found",
            Category::PointableFound   => "pointable found",
            Category::HandUpdated      => "hand updated",
            Category::PointableUpdated => "pointable updated",
            Category::KeyTap           => "key tap",
            Category::ScreenTap        => "screen tap",
            Category::Swipe            => "swipe",
            Category::Circle           => "circle",
        }
    }
}

/// Handle identifying one registration; pass to [`EventBus::unsubscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription {
    category: Category,
    id:       u64,
}

// ════════════════════════════════════════════════════════════════════════════
// Channel<T> — one category's subscriber list
// ════════════════════════════════════════════════════════════════════════════

struct Channel<T> {
    subs: Vec<(u64, Box<dyn FnMut(&T)>)>,
}

impl<T> Channel<T> {
    fn new() -> Self {
        Channel { subs: Vec::new() }
    }

    fn subscribe(&mut self, id: u64, cb: Box<dyn FnMut(&T)>) {
        self.subs.push((id, cb));
    }

    fn unsubscribe(&mut self, id: u64) -> bool {
        let before = self.subs.len();
        self.subs.retain(|(sid, _)| *sid != id);
        self.subs.len() != before
    }

    /// Invoke every subscriber in registration order.  A panicking callback
    /// is caught and logged so the remaining subscribers still run.
    fn publish(&mut self, tag: &str, event: &T) {
        for (_, cb) in self.subs.iter_mut() {
            if panic::catch_unwind(AssertUnwindSafe(|| cb(event))).is_err() {
                eprintln!("[bus] {} subscriber panicked — continuing delivery", tag);
            }
        }
    }

    fn len(&self) -> usize {
        self.subs.len()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EventBus
// ════════════════════════════════════════════════════════════════════════════

/// Per-category subscriber registry.
///
/// Single-threaded: publishing happens on the driver's tick and
/// blocks until every subscriber has run, so a slow subscriber delays the
/// next tick rather than racing it.
pub struct EventBus {
    next_id: u64,

    hand_lost:         Channel<EntityId>,
    pointable_lost:    Channel<EntityId>,
    hand_found:        Channel<TrackedEntity>,
    pointable_found:   Channel<TrackedEntity>,
    hand_updated:      Channel<TrackedEntity>,
    pointable_updated: Channel<TrackedEntity>,
    key_tap:           Channel<GestureObservation>,
    screen_tap:        Channel<GestureObservation>,
    swipe:             Channel<GestureObservation>,
    circle:            Channel<GestureObservation>,
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            next_id:           0,
            hand_lost:         Channel::new(),
            pointable_lost:    Channel::new(),
            hand_found:        Channel::new(),
            pointable_found:   Channel::new(),
            hand_updated:      Channel::new(),
            pointable_updated: Channel::new(),
            key_tap:           Channel::new(),
            screen_tap:        Channel::new(),
            swipe:             Channel::new(),
            circle:            Channel::new(),
        }
    }

    fn next_subscription(&mut self, category: Category) -> Subscription {
        self.next_id += 1;
        Subscription { category, id: self.next_id }
    }

    // ── entity subscriptions ─────────────────────────────────────────────

    /// Lost handlers receive only the id — the entity itself is gone.
    pub fn on_hand_lost(&mut self, mut f: impl FnMut(EntityId) + 'static) -> Subscription {
        let sub = self.next_subscription(Category::HandLost);
        self.hand_lost.subscribe(sub.id, Box::new(move |id| f(*id)));
        sub
    }

    pub fn on_pointable_lost(&mut self, mut f: impl FnMut(EntityId) + 'static) -> Subscription {
        let sub = self.next_subscription(Category::PointableLost);
        self.pointable_lost.subscribe(sub.id, Box::new(move |id| f(*id)));
        sub
    }

    pub fn on_hand_found(&mut self, f: impl FnMut(&TrackedEntity) + 'static) -> Subscription {
        let sub = self.next_subscription(Category::HandFound);
        self.hand_found.subscribe(sub.id, Box::new(f));
        sub
    }

    pub fn on_pointable_found(&mut self, f: impl FnMut(&TrackedEntity) + 'static) -> Subscription {
        let sub = self.next_subscription(Category::PointableFound);
        self.pointable_found.subscribe(sub.id, Box::new(f));
        sub
    }

    pub fn on_hand_updated(&mut self, f: impl FnMut(&TrackedEntity) + 'static) -> Subscription {
        let sub = self.next_subscription(Category::HandUpdated);
        self.hand_updated.subscribe(sub.id, Box::new(f));
        sub
    }

    pub fn on_pointable_updated(&mut self, f: impl FnMut(&TrackedEntity) + 'static) -> Subscription {
        let sub = self.next_subscription(Category::PointableUpdated);
        self.pointable_updated.subscribe(sub.id, Box::new(f));
        sub
    }

    // ── gesture subscriptions ────────────────────────────────────────────

    pub fn on_key_tap(&mut self, f: impl FnMut(&GestureObservation) + 'static) -> Subscription {
        let sub = self.next_subscription(Category::KeyTap);
        self.key_tap.subscribe(sub.id, Box::new(f));
        sub
    }

    pub fn on_screen_tap(&mut self, f: impl FnMut(&GestureObservation) + 'static) -> Subscription {
        let sub = self.next_subscription(Category::ScreenTap);
        self.screen_tap.subscribe(sub.id, Box::new(f));
        sub
    }

    pub fn on_swipe(&mut self, f: impl FnMut(&GestureObservation) + 'static) -> Subscription {
        let sub = self.next_subscription(Category::Swipe);
        self.swipe.subscribe(sub.id, Box::new(f));
        sub
    }

    pub fn on_circle(&mut self, f: impl FnMut(&GestureObservation) + 'static) -> Subscription {
        let sub = self.next_subscription(Category::Circle);
        self.circle.subscribe(sub.id, Box::new(f));
        sub
    }

    // ── unsubscribe / introspection ──────────────────────────────────────

    /// Remove a registration.  Returns false if the handle was already gone.
    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        match sub.category {
            Category::HandLost         => self.hand_lost.unsubscribe(sub.id),
            Category::PointableLost    => self.pointable_lost.unsubscribe(sub.id),
            Category::HandFound        => self.hand_found.unsubscribe(sub.id),
            Category::PointableFound   => self.pointable_found.unsubscribe(sub.id),
            Category::HandUpdated      => self.hand_updated.unsubscribe(sub.id),
            Category::PointableUpdated => self.pointable_updated.unsubscribe(sub.id),
            Category::KeyTap           => self.key_tap.unsubscribe(sub.id),
            Category::ScreenTap        => self.screen_tap.unsubscribe(sub.id),
            Category::Swipe            => self.swipe.unsubscribe(sub.id),
            Category::Circle           => self.circle.unsubscribe(sub.id),
        }
    }

    pub fn subscriber_count(&self, category: Category) -> usize {
        match category {
            Category::HandLost         => self.hand_lost.len(),
            Category::PointableLost    => self.pointable_lost.len(),
            Category::HandFound        => self.hand_found.len(),
            Category::PointableFound   => self.pointable_found.len(),
            Category::HandUpdated      => self.hand_updated.len(),
            Category::PointableUpdated => self.pointable_updated.len(),
            Category::KeyTap           => self.key_tap.len(),
            Category::ScreenTap        => self.screen_tap.len(),
            Category::Swipe            => self.swipe.len(),
            Category::Circle           => self.circle.len(),
        }
    }

    // ── publishing ───────────────────────────────────────────────────────

    /// Fan out one tick's delta in the fixed category order.
    ///
    /// Publishing a category with zero subscribers is a no-op, and a
    /// panicking subscriber never blocks later subscribers or categories.
    pub fn publish_delta(&mut self, delta: &FrameDelta) {
        for l in &delta.lost {
            match l.kind {
                EntityKind::Hand      => self.hand_lost.publish("hand-lost", &l.id),
                EntityKind::Pointable => self.pointable_lost.publish("pointable-lost", &l.id),
            }
        }
        for e in &delta.found {
            match e.kind {
                EntityKind::Hand      => self.hand_found.publish("hand-found", e),
                EntityKind::Pointable => self.pointable_found.publish("pointable-found", e),
            }
        }
        for e in &delta.updated {
            match e.kind {
                EntityKind::Hand      => self.hand_updated.publish("hand-updated", e),
                EntityKind::Pointable => self.pointable_updated.publish("pointable-updated", e),
            }
        }
        for g in &delta.gestures {
            match g.kind {
                GestureKind::KeyTap    => self.key_tap.publish("key-tap", g),
                GestureKind::ScreenTap => self.screen_tap.publish("screen-tap", g),
                GestureKind::Swipe     => self.swipe.publish("swipe", g),
                GestureKind::Circle    => self.circle.publish("circle", g),
                // The differ filters unclassified observations.
                GestureKind::Invalid   => {}
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use frame_diff::LostEntity;
    use leap_frame::{GestureState, Vec3};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn delta_with(
        lost:     Vec<LostEntity>,
        found:    Vec<TrackedEntity>,
        updated:  Vec<TrackedEntity>,
        gestures: Vec<GestureObservation>,
    ) -> FrameDelta {
        FrameDelta { lost, found, updated, gestures }
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = log.clone();
        bus.on_hand_found(move |e| l1.borrow_mut().push(("first", e.id)));
        let l2 = log.clone();
        bus.on_hand_found(move |e| l2.borrow_mut().push(("second", e.id)));

        let delta = delta_with(
            vec![],
            vec![TrackedEntity::hand(1, Vec3::ZERO)],
            vec![],
            vec![],
        );
        bus.publish_delta(&delta);

        assert_eq!(*log.borrow(), vec![("first", 1), ("second", 1)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let c = count.clone();
        let sub = bus.on_hand_lost(move |_| *c.borrow_mut() += 1);
        assert_eq!(bus.subscriber_count(Category::HandLost), 1);

        let delta = delta_with(
            vec![LostEntity { kind: EntityKind::Hand, id: 1 }],
            vec![],
            vec![],
            vec![],
        );
        bus.publish_delta(&delta);
        assert_eq!(*count.borrow(), 1);

        assert!(bus.unsubscribe(sub));
        assert_eq!(bus.subscriber_count(Category::HandLost), 0);
        bus.publish_delta(&delta);
        assert_eq!(*count.borrow(), 1);

        // Second unsubscribe of the same handle is a no-op.
        assert!(!bus.unsubscribe(sub));
    }

    #[test]
    fn publish_with_no_subscribers_is_a_noop() {
        let mut bus = EventBus::new();
        let delta = delta_with(
            vec![LostEntity { kind: EntityKind::Pointable, id: 9 }],
            vec![TrackedEntity::hand(1, Vec3::ZERO)],
            vec![],
            vec![GestureObservation::new(2, GestureKind::Swipe, GestureState::Start, 1)],
        );
        bus.publish_delta(&delta);
    }

    #[test]
    fn panicking_subscriber_does_not_starve_the_rest() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        bus.on_key_tap(|_| panic!("subscriber failure"));
        let l = log.clone();
        bus.on_key_tap(move |g| l.borrow_mut().push(g.id));

        let delta = delta_with(
            vec![],
            vec![],
            vec![],
            vec![GestureObservation::new(5, GestureKind::KeyTap, GestureState::Stop, 1)],
        );
        bus.publish_delta(&delta);
        assert_eq!(*log.borrow(), vec![5]);

        // The bus stays usable after the panic.
        bus.publish_delta(&delta);
        assert_eq!(*log.borrow(), vec![5, 5]);
    }

    #[test]
    fn categories_deliver_in_fixed_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        bus.on_hand_lost(move |_| l.borrow_mut().push("lost"));
        let l = log.clone();
        bus.on_pointable_lost(move |_| l.borrow_mut().push("p-lost"));
        let l = log.clone();
        bus.on_hand_found(move |_| l.borrow_mut().push("found"));
        let l = log.clone();
        bus.on_hand_updated(move |_| l.borrow_mut().push("updated"));
        let l = log.clone();
        bus.on_circle(move |_| l.borrow_mut().push("circle"));

        let delta = delta_with(
            vec![
                LostEntity { kind: EntityKind::Hand, id: 1 },
                LostEntity { kind: EntityKind::Pointable, id: 2 },
            ],
            vec![TrackedEntity::hand(3, Vec3::ZERO)],
            vec![TrackedEntity::hand(4, Vec3::ZERO)],
            vec![GestureObservation::new(6, GestureKind::Circle, GestureState::Update, 1)],
        );
        bus.publish_delta(&delta);

        assert_eq!(
            *log.borrow(),
            vec!["lost", "p-lost", "found", "updated", "circle"]
        );
    }

    #[test]
    fn gestures_route_by_kind() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        bus.on_swipe(move |g| l.borrow_mut().push(("swipe", g.id)));
        let l = log.clone();
        bus.on_screen_tap(move |g| l.borrow_mut().push(("screen-tap", g.id)));

        let delta = delta_with(
            vec![],
            vec![],
            vec![],
            vec![
                GestureObservation::new(1, GestureKind::Swipe, GestureState::Start, 1),
                GestureObservation::new(2, GestureKind::ScreenTap, GestureState::Stop, 1),
                GestureObservation::new(3, GestureKind::KeyTap, GestureState::Stop, 1),
            ],
        );
        bus.publish_delta(&delta);

        // The key tap had no subscriber; swipe and screen tap each saw only
        // their own observation.
        assert_eq!(*log.borrow(), vec![("swipe", 1), ("screen-tap", 2)]);
    }
}
