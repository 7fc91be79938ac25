//! Runtime configuration for a tracking run.

use std::time::Duration;

use leap_frame::Vec3;

/// Interval used when fixed stepping is picked without an explicit value.
pub const DEFAULT_FIXED_INTERVAL: Duration = Duration::from_millis(20);

// ════════════════════════════════════════════════════════════════════════════
// SteppingMode
// ════════════════════════════════════════════════════════════════════════════

/// Which external stepping source drives the polling driver.
///
/// Exactly one source steps the driver per run; the driver itself never
/// schedules anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteppingMode {
    /// One tick per monitor frame (variable rate, roughly 60 Hz).
    PerFrame,
    /// Ticks at a fixed interval, decoupled from the monitor's frame rate.
    FixedInterval(Duration),
}

// ════════════════════════════════════════════════════════════════════════════
// TrackerConfig
// ════════════════════════════════════════════════════════════════════════════

/// Options recognized by the tracking stack.
///
/// Scale and offset convert device space (millimetres, sensor origin) into a
/// collaborator's world space via [`Vec3::scaled`].  The core publishes raw
/// device coordinates; applying the mapping is the collaborator's job.
#[derive(Clone, Copy, Debug)]
pub struct TrackerConfig {
    pub coordinate_scale:  Vec3,
    pub coordinate_offset: Vec3,
    pub stepping:          SteppingMode,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            coordinate_scale:  Vec3::splat(0.02),
            coordinate_offset: Vec3::ZERO,
            stepping:          SteppingMode::PerFrame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_options() {
        let cfg = TrackerConfig::default();
        assert_eq!(cfg.coordinate_scale, Vec3::splat(0.02));
        assert_eq!(cfg.coordinate_offset, Vec3::ZERO);
        assert_eq!(cfg.stepping, SteppingMode::PerFrame);
    }
}
