//! Wires the device session, the tracker, and the monitor into a running
//! application.
//!
//! All ticking, diffing, and dispatch happen synchronously inside this
//! loop's step call — there is no internal threading.  The stepping mode
//! decides cadence: one tick per monitor frame, or ticks on a fixed
//! interval decoupled from the render rate.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Instant;

use crate::bus::EventBus;
use crate::config::{SteppingMode, TrackerConfig};
use crate::driver::Tracker;
use crate::monitor::Monitor;
use crate::session::DeviceSession;
use crate::sim::SimInput;

#[cfg(not(feature = "leap"))]
use crate::sim::SimDevice;
#[cfg(feature = "leap")]
use crate::session::LeapSession;

/// Lines kept in the scrolling event log.
const LOG_CAP: usize = 200;

type EventLog = Rc<RefCell<Vec<String>>>;

fn note(log: &EventLog, line: String) {
    let mut l = log.borrow_mut();
    if l.len() >= LOG_CAP {
        l.remove(0);
    }
    l.push(line);
}

// ════════════════════════════════════════════════════════════════════════════
// Subscriptions — the demo's consumers of the event stream
// ════════════════════════════════════════════════════════════════════════════

/// Register the monitor-facing subscribers: lifecycle and gesture events go
/// to the scrolling log, updated events (which fire every frame a survivor
/// persists) only bump a counter.
fn subscribe_logging(bus: &mut EventBus, log: &EventLog, updates: &Rc<RefCell<u64>>) {
    let l = log.clone();
    bus.on_hand_lost(move |id| note(&l, format!("hand lost       #{}", id)));
    let l = log.clone();
    bus.on_pointable_lost(move |id| note(&l, format!("pointable lost  #{}", id)));
    let l = log.clone();
    bus.on_hand_found(move |e| note(&l, format!("hand found      #{}", e.id)));
    let l = log.clone();
    bus.on_pointable_found(move |e| note(&l, format!("pointable found #{}", e.id)));

    let u = updates.clone();
    bus.on_hand_updated(move |_| *u.borrow_mut() += 1);
    let u = updates.clone();
    bus.on_pointable_updated(move |_| *u.borrow_mut() += 1);

    let l = log.clone();
    bus.on_key_tap(move |g| note(&l, format!("key tap         #{}", g.id)));
    let l = log.clone();
    bus.on_screen_tap(move |g| note(&l, format!("screen tap      #{}", g.id)));
    let l = log.clone();
    bus.on_swipe(move |g| note(&l, format!("swipe {}  #{}", g.state.name(), g.id)));
    let l = log.clone();
    bus.on_circle(move |g| note(&l, format!("circle {}  #{}", g.state.name(), g.id)));
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the device session (simulation by default, hardware with
/// `--features leap`), connects the tracker, registers the logging
/// subscribers, and drives the loop in the configured stepping mode.
pub fn run(cfg: TrackerConfig) -> Result<(), String> {
    // ── Sim input channel (monitor → device) ─────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    #[cfg(not(feature = "leap"))]
    let device: Box<dyn DeviceSession> = Box::new(SimDevice::new(sim_rx));
    #[cfg(feature = "leap")]
    let device: Box<dyn DeviceSession> = {
        // Hardware mode ignores keyboard sim inputs.
        drop(sim_rx);
        Box::new(LeapSession::connect()?)
    };

    let mut tracker = Tracker::connect(device, cfg)?;

    // ── Subscribers ──────────────────────────────────────────────────────
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let updates = Rc::new(RefCell::new(0u64));
    subscribe_logging(tracker.bus(), &log, &updates);

    // ── Monitor window ───────────────────────────────────────────────────
    let mut monitor = Monitor::new(sim_tx)?;

    // ── Main loop ────────────────────────────────────────────────────────
    let mut next_tick = Instant::now();

    while monitor.is_open() {
        if !monitor.poll_input() {
            break;
        }

        match cfg.stepping {
            SteppingMode::PerFrame => tracker.step(),
            SteppingMode::FixedInterval(interval) => {
                // Catch up missed intervals, capped so a long stall cannot
                // burst an unbounded tick storm.
                let mut steps = 0;
                while Instant::now() >= next_tick && steps < 4 {
                    tracker.step();
                    next_tick += interval;
                    steps += 1;
                }
                if steps == 4 {
                    next_tick = Instant::now();
                }
            }
        }

        let frame = tracker.current_frame();
        let status = format!(
            "frame {}   hands {}   pointables {}   updates {}",
            frame.frame_id(),
            frame.hands().len(),
            frame.pointables().len(),
            updates.borrow(),
        );
        monitor.render(
            frame,
            cfg.coordinate_scale,
            cfg.coordinate_offset,
            &log.borrow(),
            &status,
        );
    }

    Ok(())
}
