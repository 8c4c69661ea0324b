//! Synthesized audio cues.
//!
//! - [`tone`]: oscillator notes rendered to PCM
//! - [`backend`]: where rendered cues go (bell, WAV capture, silence)
//! - [`context`]: the scoped, lazily acquired audio resource

pub mod backend;
pub mod context;
pub mod tone;

use serde::{Deserialize, Serialize};

pub use backend::{AudioBackend, BellBackend, SilentBackend, WavBackend};
pub use context::{AudioContext, AudioHandle, ContextState};
pub use tone::ToneSequence;

/// A discrete sound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    /// Keystroke click during the boot typing effect.
    Click,
    /// Chime played on acceptance.
    Success,
}

impl std::fmt::Display for AudioCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Click => write!(f, "click"),
            Self::Success => write!(f, "success"),
        }
    }
}
