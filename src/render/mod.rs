//! Terminal rendering.
//!
//! - [`frame`]: pure cell buffer and view painter
//! - [`confetti`]: particle animation for acceptance bursts
//! - [`terminal`]: raw mode guard and frame output

pub mod confetti;
pub mod frame;
pub mod terminal;

pub use confetti::ParticleField;
pub use frame::{FrameBuffer, Tone, paint};
pub use terminal::{TerminalGuard, force_restore, present};
