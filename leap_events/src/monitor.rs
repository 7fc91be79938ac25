//! Software-rendered tracking monitor using `minifb`.
//!
//! The monitor is a collaborator, not part of the core: it subscribes to
//! nothing itself, but renders whatever snapshot and event log the app hands
//! it, and translates keyboard input into [`SimInput`]s for the simulated
//! device.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  tracked entities (colored discs, device → world → pixels)   │
//! │                                                              │
//! │  event log (most recent events, newest at the bottom)        │
//! │  status bar                                                  │
//! │  key legend                                                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Device coordinates are mapped through the configured scale/offset into
//! world space, then into pixels — the core publishes raw device space and
//! conversion happens here, on the consuming side.

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use leap_frame::{EntityId, FrameSnapshot, Vec3};

use crate::sim::SimInput;

use std::sync::mpsc::Sender;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 960;
pub const WIN_H: usize = 540;

const LOG_LINES:    usize = 10;
const LOG_Y:        usize = WIN_H - 210;
const STATUS_Y:     usize = WIN_H - 40;
const PX_PER_UNIT:  f32   = 60.0;
const GROUND_Y:     usize = WIN_H - 60;
const NUDGE_MM:     f32   = 4.0;

const BG_COLOR:     u32 = 0xFF10101C;
const PANEL_BG:     u32 = 0xFF0F2236;
const TEXT_DIM:     u32 = 0xFF8899AA;
const TEXT_BRIGHT:  u32 = 0xFFEEEEEE;

// ════════════════════════════════════════════════════════════════════════════
// Monitor
// ════════════════════════════════════════════════════════════════════════════

pub struct Monitor {
    window: Window,
    buf:    Vec<u32>,
    sim_tx: Sender<SimInput>,

    // Edge detection for held keys.
    swipe_down:   bool,
    circle_down:  bool,
    dropout_down: bool,
}

impl Monitor {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, String> {
        let mut window = Window::new(
            "Leap Events — Tracking Monitor",
            WIN_W,
            WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Monitor {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            swipe_down:   false,
            circle_down:  false,
            dropout_down: false,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll keyboard input and translate to SimInput events.
    /// Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);
        let held     = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(&self.window, Key::Q) {
            return false;
        }
        if one_shot(&self.window, Key::Key1) {
            let _ = self.sim_tx.send(SimInput::ToggleHand(0));
        }
        if one_shot(&self.window, Key::Key2) {
            let _ = self.sim_tx.send(SimInput::ToggleHand(1));
        }
        if one_shot(&self.window, Key::F) {
            let _ = self.sim_tx.send(SimInput::ToggleFinger);
        }
        if one_shot(&self.window, Key::K) {
            let _ = self.sim_tx.send(SimInput::KeyTap);
        }
        if one_shot(&self.window, Key::T) {
            let _ = self.sim_tx.send(SimInput::ScreenTap);
        }

        // Arrow nudges repeat while held.
        if held(&self.window, Key::Left) {
            let _ = self.sim_tx.send(SimInput::Nudge(-NUDGE_MM, 0.0));
        }
        if held(&self.window, Key::Right) {
            let _ = self.sim_tx.send(SimInput::Nudge(NUDGE_MM, 0.0));
        }
        if held(&self.window, Key::Up) {
            let _ = self.sim_tx.send(SimInput::Nudge(0.0, NUDGE_MM));
        }
        if held(&self.window, Key::Down) {
            let _ = self.sim_tx.send(SimInput::Nudge(0.0, -NUDGE_MM));
        }

        // Held gestures and dropout report press/release edges.
        let swipe = self.window.is_key_down(Key::S);
        if swipe != self.swipe_down {
            self.swipe_down = swipe;
            let _ = self.sim_tx.send(SimInput::SwipeHeld(swipe));
        }
        let circle = self.window.is_key_down(Key::C);
        if circle != self.circle_down {
            self.circle_down = circle;
            let _ = self.sim_tx.send(SimInput::CircleHeld(circle));
        }
        let dropout = self.window.is_key_down(Key::U);
        if dropout != self.dropout_down {
            self.dropout_down = dropout;
            let _ = self.sim_tx.send(SimInput::DropoutHeld(dropout));
        }

        true
    }

    /// Render one frame: the snapshot's entities, the event log, status.
    pub fn render(
        &mut self,
        snapshot: &FrameSnapshot,
        scale:    Vec3,
        offset:   Vec3,
        log:      &[String],
        status:   &str,
    ) {
        self.buf.fill(BG_COLOR);

        // ── Tracked entities ─────────────────────────────────────────────
        for hand in snapshot.hands().iter() {
            let (x, y) = self.project(hand.position, scale, offset);
            self.draw_disc(x, y, 16, id_color(hand.id));
            self.draw_label(&format!("h{}", hand.id), x + 20, y - 2, TEXT_BRIGHT);
        }
        for p in snapshot.pointables().iter() {
            let (x, y) = self.project(p.position, scale, offset);
            self.draw_disc(x, y, 7, id_color(p.id));
            self.draw_label(&format!("p{}", p.id), x + 11, y - 2, TEXT_DIM);
        }

        // ── Event log panel ──────────────────────────────────────────────
        self.fill_rect(0, LOG_Y - 8, WIN_W, STATUS_Y - LOG_Y + 8, PANEL_BG);
        let start = log.len().saturating_sub(LOG_LINES);
        for (i, line) in log[start..].iter().enumerate() {
            self.draw_label(line, 10, (LOG_Y + i * 16) as isize, TEXT_DIM);
        }

        // ── Status bar + key legend ──────────────────────────────────────
        self.draw_label(status, 10, STATUS_Y as isize, TEXT_BRIGHT);
        self.draw_label(
            "1/2=hands  f=finger  arrows=move  k=keytap  t=screentap  s=swipe  c=circle  u=dropout  q=quit",
            10,
            (WIN_H - 16) as isize,
            TEXT_DIM,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    /// Device mm → world units (configured scale/offset) → screen pixels.
    fn project(&self, device: Vec3, scale: Vec3, offset: Vec3) -> (isize, isize) {
        let world = device.scaled(scale, offset);
        let x = WIN_W as f32 / 2.0 + world.x * PX_PER_UNIT;
        let y = GROUND_Y as f32 - world.y * PX_PER_UNIT;
        (x as isize, y as isize)
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn draw_disc(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Minimal bitmap font — 3×5 characters for label rendering.
    fn draw_label(&mut self, text: &str, x: isize, y: isize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3isize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel(cx + col, y + row as isize, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > WIN_W as isize {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Colors and glyphs
// ────────────────────────────────────────────────────────────────────────────

/// Map an entity id to a stable, distinct ARGB color via a spaced hue wheel.
fn id_color(id: EntityId) -> u32 {
    let hue = (id.rem_euclid(12) as f32 / 12.0) * 360.0;
    hsv_to_argb(hue, 0.78, 0.95)
}

/// Convert HSV → packed ARGB (0xAARRGGBB, A=0xFF).
fn hsv_to_argb(h: f32, s: f32, v: f32) -> u32 {
    let h  = h % 360.0;
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let ri = (r * 255.0) as u32;
    let gi = (g * 255.0) as u32;
    let bi = (b * 255.0) as u32;
    0xFF000000 | (ri << 16) | (gi << 8) | bi
}

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
