//! Structured event stream.
//!
//! Discrete, typed events emitted while an experience runs. Events are
//! serialized as newline-delimited JSON (JSONL) and carry a monotonically
//! increasing sequence number plus the session they belong to.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audio::AudioCue;
use crate::confetti::BurstKind;
use crate::phase::Phase;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The quit key was pressed.
    Quit,
    /// SIGINT / Ctrl+C from outside the terminal's raw input.
    Interrupted,
    /// SIGTERM.
    Terminated,
    /// The terminal input stream ended.
    InputClosed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quit => write!(f, "quit"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Terminated => write!(f, "terminated"),
            Self::InputClosed => write!(f, "input_closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a session.
///
/// Tagged with `"type"` when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The experience was mounted.
    SessionStarted {
        /// When the session started.
        timestamp: DateTime<Utc>,
        /// Number of photos discovered.
        photos: usize,
        /// Number of rain items generated from them.
        items: usize,
    },

    /// The experience moved to a new phase.
    PhaseEntered {
        /// When the transition happened.
        timestamp: DateTime<Utc>,
        /// Phase that was left.
        from: Phase,
        /// Phase that was entered.
        phase: Phase,
    },

    /// An audio cue was handed to a running audio context.
    CueEmitted {
        /// When the cue was emitted.
        timestamp: DateTime<Utc>,
        /// Which cue.
        cue: AudioCue,
    },

    /// A confetti burst was requested.
    ConfettiFired {
        /// When the burst fired.
        timestamp: DateTime<Utc>,
        /// Which burst.
        burst: BurstKind,
        /// Particles in the burst.
        particle_count: u32,
    },

    /// A rejection message was shown.
    RejectionShown {
        /// When it was shown.
        timestamp: DateTime<Utc>,
        /// The message text.
        message: String,
    },

    /// The session ended.
    SessionStopped {
        /// When the session ended.
        timestamp: DateTime<Utc>,
        /// Why it ended.
        reason: StopReason,
        /// Phase at the time.
        phase: Phase,
    },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope<'a> {
    sequence: u64,
    session_id: &'a Uuid,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are dropped; the event stream never ends a
/// session.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
    session_id: Uuid,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("session_id", &self.session_id)
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter writing to `writer` under a fresh session id.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
            session_id: Uuid::new_v4(),
        }
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Session id stamped on every event.
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence,
            session_id: &self.session_id,
            event,
        };

        if let Ok(mut w) = self.writer.lock()
            && let Ok(line) = serde_json::to_string(&envelope)
        {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::noop()
    }
}
