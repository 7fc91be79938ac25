//! # leap_events
//!
//! Lifecycle-event engine for motion-sensing input.  A polling driver pulls
//! one frame snapshot per tick from a device session, diffs it against the
//! previous snapshot ([`frame_diff`]), and fans the result out through a
//! typed event bus to whatever subscribers registered.
//!
//! ## Event categories (delivery order within one tick)
//!
//! | Category | Handler receives |
//! |---|---|
//! | Hand lost / Pointable lost | entity id |
//! | Hand found / Pointable found | the full new entity |
//! | Hand updated / Pointable updated | the full new entity |
//! | Key tap / Screen tap / Swipe / Circle | the gesture observation |
//!
//! Hands always precede pointables within a category, and a found event for
//! an id is never followed by a lost event for it in the same tick.  Swipe
//! and circle observations carry their lifecycle state (start / update /
//! stop) for the subscriber to interpret.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard drives a synthetic device.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via
//!   LeapC.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Effect |
//! |---|---|
//! | `1` / `2` | Toggle hand 0 / hand 1 |
//! | `F` | Toggle the finger pointable on hand 0 |
//! | Arrows | Move the tracked entities |
//! | `K` | Key tap |
//! | `T` | Screen tap |
//! | `S` (hold) | Swipe — start / update / stop |
//! | `C` (hold) | Circle — start / update / stop |
//! | `U` (hold) | Device dropout (polling unavailable) |
//! | `Q` | Quit |

pub mod bus;
pub mod config;
pub mod driver;
pub mod session;
pub mod sim;
pub mod monitor;
pub mod app;
