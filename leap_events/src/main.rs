//! leap_events — interactive entry point.

use std::io::{self, Write};
use std::time::Duration;

use leap_events::app::run;
use leap_events::config::{SteppingMode, TrackerConfig, DEFAULT_FIXED_INTERVAL};
use leap_frame::Vec3;

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Leap Events — Frame Lifecycle Event Monitor           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: per-frame stepping, scale 0.02\n");
        TrackerConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening monitor window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> TrackerConfig {
    let stepping = loop {
        println!("  Stepping source:");
        println!("    1. Per monitor frame (variable rate, ~60 Hz)");
        println!("    2. Fixed interval");
        match read_line("  Choice (1–2, default 1): ").trim() {
            "2" => {
                let ms: u64 = read_line("    Interval ms (default 20): ")
                    .trim().parse().unwrap_or(DEFAULT_FIXED_INTERVAL.as_millis() as u64);
                break SteppingMode::FixedInterval(Duration::from_millis(ms.clamp(1, 1000)));
            }
            _ => break SteppingMode::PerFrame,
        }
    };

    let scale: f32 = {
        let s: f32 = read_line("  Coordinate scale (default 0.02): ")
            .trim().parse().unwrap_or(0.02);
        s.clamp(0.001, 1.0)
    };

    TrackerConfig {
        coordinate_scale:  Vec3::splat(scale),
        coordinate_offset: Vec3::ZERO,
        stepping,
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
