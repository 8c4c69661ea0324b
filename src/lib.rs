//! `valentine` - a scripted, terminal-rendered greeting experience
//!
//! A boot sequence types itself out, a photo montage rains down the
//! screen, and a single question waits for a yes. This library holds the
//! pieces: the phase machine, seeded layout, typing, audio cues, confetti
//! and the terminal session that ties them together.

pub mod audio;
pub mod cli;
pub mod config;
pub mod confetti;
pub mod error;
pub mod layout;
pub mod observability;
pub mod phase;
pub mod photos;
pub mod render;
pub mod session;
pub mod typewriter;
