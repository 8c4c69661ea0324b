//! Confetti bursts.
//!
//! The experience only describes bursts; drawing them is the job of a
//! [`ConfettiSink`]. [`LazyConfetti`] stands in until a sink is loaded, so
//! bursts requested before that are silently dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Default warm-gold palette.
pub const DEFAULT_COLORS: &[&str] = &["#f7c56b", "#ffd37b", "#f9d89b", "#fff2cf", "#c9a35a"];

/// Which of the two acceptance bursts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurstKind {
    /// The denser, lower burst.
    Primary,
    /// The wider, faster burst.
    Secondary,
}

impl std::fmt::Display for BurstKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

/// Parameter bundle for one burst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfettiBurst {
    /// Number of particles.
    pub particle_count: u32,
    /// Angular spread in degrees.
    pub spread: f32,
    /// Vertical origin as a fraction of the screen height.
    pub origin_y: f32,
    /// Initial particle speed.
    pub start_velocity: f32,
    /// Particle lifetime in animation ticks.
    pub ticks: u32,
    /// Particle size multiplier.
    pub scalar: f32,
    /// Colors as `#rrggbb`.
    pub colors: Vec<String>,
}

impl ConfettiBurst {
    /// The bundle for `kind` using `colors`.
    #[must_use]
    pub fn for_kind(kind: BurstKind, colors: &[String]) -> Self {
        let colors = colors.to_vec();
        match kind {
            BurstKind::Primary => Self {
                particle_count: 320,
                spread: 90.0,
                origin_y: 0.6,
                start_velocity: 45.0,
                ticks: 260,
                scalar: 1.1,
                colors,
            },
            BurstKind::Secondary => Self {
                particle_count: 200,
                spread: 120.0,
                origin_y: 0.5,
                start_velocity: 55.0,
                ticks: 300,
                scalar: 1.2,
                colors,
            },
        }
    }
}

/// Anything that can draw a burst. Fire-and-forget.
pub trait ConfettiSink: Send {
    /// Starts a burst.
    fn fire(&mut self, burst: &ConfettiBurst);
}

/// Forwards bursts over a channel to whoever animates them.
#[derive(Debug, Clone)]
pub struct ChannelConfetti {
    tx: mpsc::UnboundedSender<ConfettiBurst>,
}

impl ChannelConfetti {
    /// Creates a sink and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ConfettiBurst>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ConfettiSink for ChannelConfetti {
    fn fire(&mut self, burst: &ConfettiBurst) {
        // A closed receiver means nobody is drawing any more.
        let _ = self.tx.send(burst.clone());
    }
}

/// A sink that may not be loaded yet.
#[derive(Default)]
pub struct LazyConfetti {
    sink: Option<Box<dyn ConfettiSink>>,
}

impl LazyConfetti {
    /// An unloaded sink; bursts are dropped until [`load`](Self::load).
    #[must_use]
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// Installs the real sink.
    pub fn load(&mut self, sink: Box<dyn ConfettiSink>) {
        self.sink = Some(sink);
    }

    /// Whether a sink has been installed.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.sink.is_some()
    }
}

impl ConfettiSink for LazyConfetti {
    fn fire(&mut self, burst: &ConfettiBurst) {
        match self.sink.as_mut() {
            Some(sink) => sink.fire(burst),
            None => debug!(particles = burst.particle_count, "confetti not loaded; burst dropped"),
        }
    }
}

impl std::fmt::Debug for LazyConfetti {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyConfetti")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
