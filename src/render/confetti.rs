//! Terminal confetti.
//!
//! Particles follow the usual confetti model: launched upward within the
//! burst's spread, slowed by drag every tick, pulled down by gravity, and
//! removed after the burst's tick budget. Positions live in a virtual
//! canvas of 8x16 "pixels" per cell so velocities keep their usual scale.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::confetti::ConfettiBurst;

use super::frame::{FrameBuffer, Tone};

const CELL_W: f64 = 8.0;
const CELL_H: f64 = 16.0;
const DECAY: f64 = 0.9;
const GRAVITY: f64 = 3.0;
const GLYPHS: [char; 4] = ['\u{25aa}', '\u{25b4}', '\u{2022}', '\u{2736}'];
const FALLBACK_RGB: (u8, u8, u8) = (0xf7, 0xc5, 0x6b);

#[derive(Debug, Clone)]
struct Particle {
    x: f64,
    y: f64,
    angle: f64,
    velocity: f64,
    tick: u32,
    total_ticks: u32,
    glyph: char,
    rgb: (u8, u8, u8),
}

impl Particle {
    fn advance(&mut self) {
        self.x += self.angle.cos() * self.velocity;
        self.y += self.angle.sin() * self.velocity + GRAVITY;
        self.velocity *= DECAY;
        self.tick += 1;
    }

    const fn is_done(&self) -> bool {
        self.tick >= self.total_ticks
    }
}

/// Live confetti particles.
#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    rng: StdRng,
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl ParticleField {
    /// An empty field using `rng` for launch jitter.
    #[must_use]
    pub const fn new(rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            rng,
        }
    }

    /// Number of live particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether nothing is animating.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Launches `burst` from the horizontal centre of a `width` x `height`
    /// cell area.
    pub fn spawn(&mut self, burst: &ConfettiBurst, width: u16, height: u16) {
        let origin_x = f64::from(width) * CELL_W * 0.5;
        let origin_y = f64::from(height) * CELL_H * f64::from(burst.origin_y);
        let spread = f64::from(burst.spread).to_radians();
        let start_velocity = f64::from(burst.start_velocity);
        let palette: Vec<(u8, u8, u8)> = burst.colors.iter().filter_map(|c| parse_hex(c)).collect();
        let glyph_span = if burst.scalar > 1.15 { GLYPHS.len() } else { 3 };

        self.particles.reserve(burst.particle_count as usize);
        for _ in 0..burst.particle_count {
            // Upward is -PI/2 on a y-down canvas.
            let angle = -PI / 2.0 + (0.5 * spread - self.rng.random::<f64>() * spread);
            let velocity = start_velocity * 0.5 + self.rng.random::<f64>() * start_velocity;
            let rgb = if palette.is_empty() {
                FALLBACK_RGB
            } else {
                palette[self.rng.random_range(0..palette.len())]
            };
            self.particles.push(Particle {
                x: origin_x,
                y: origin_y,
                angle,
                velocity,
                tick: 0,
                total_ticks: burst.ticks,
                glyph: GLYPHS[self.rng.random_range(0..glyph_span)],
                rgb,
            });
        }
    }

    /// Advances every particle one tick and drops expired ones.
    pub fn step(&mut self) {
        for particle in &mut self.particles {
            particle.advance();
        }
        self.particles.retain(|p| !p.is_done());
    }

    /// Draws particles over `frame`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn draw(&self, frame: &mut FrameBuffer) {
        for p in &self.particles {
            let col = (p.x / CELL_W).floor() as i32;
            let row = (p.y / CELL_H).floor() as i32;
            let (r, g, b) = p.rgb;
            frame.put_char(col, row, p.glyph, Tone::Rgb(r, g, b));
        }
    }
}

/// Parses `#rrggbb`.
fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
