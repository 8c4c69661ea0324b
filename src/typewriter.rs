//! Boot-script typing effect.
//!
//! [`TypewriterCursor`] is the pure stepper: one call to
//! [`step`](TypewriterCursor::step) is one tick. [`TypewriterRunner`] drives
//! a cursor on a tokio task, sleeping between ticks, and reports each tick
//! over a channel. The task never touches experience state itself; the
//! receiver applies ticks only while the run they belong to is current.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Identifies one typing run. A restart always gets a fresh id.
pub type RunId = u64;

/// Delays that pace the typing effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingTiming {
    /// Pause before the first tick.
    pub start_delay: Duration,
    /// Pause after an ordinary character.
    pub char_delay: Duration,
    /// Pause after a newline (paragraph effect).
    pub newline_delay: Duration,
    /// Pause after the last tick before the run reports it has settled.
    pub settle_delay: Duration,
}

impl Default for TypingTiming {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(180),
            char_delay: Duration::from_millis(48),
            newline_delay: Duration::from_millis(220),
            settle_delay: Duration::from_millis(950),
        }
    }
}

/// One tick of the typing effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypewriterTick {
    /// Script prefix to display.
    pub text: String,
    /// Whether a keystroke cue accompanies this tick (the next character
    /// exists and is not a newline).
    pub click: bool,
    /// Pause before the next tick.
    pub delay: Duration,
}

/// Pure typing state: a script and how much of it has been shown.
#[derive(Debug, Clone)]
pub struct TypewriterCursor {
    script: Arc<str>,
    /// Byte offset of every char boundary, including the end.
    boundaries: Vec<usize>,
    index: usize,
    timing: TypingTiming,
}

impl TypewriterCursor {
    /// Creates a cursor at the start of `script`.
    #[must_use]
    pub fn new(script: Arc<str>, timing: TypingTiming) -> Self {
        let boundaries = script
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(script.len()))
            .collect();
        Self {
            script,
            boundaries,
            index: 0,
            timing,
        }
    }

    /// Number of characters in the script.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Whether the script is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of ticks taken so far.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Whether every tick has been taken.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.index > self.len()
    }

    /// Takes the next tick, or `None` once the full script has been shown.
    ///
    /// A script of `n` characters yields `n + 1` ticks, the first showing
    /// the empty prefix.
    pub fn step(&mut self) -> Option<TypewriterTick> {
        if self.is_finished() {
            return None;
        }
        let shown = self.boundaries[self.index];
        let text = self.script[..shown].to_string();
        let next = self.script[shown..].chars().next();
        self.index += 1;

        let delay = if next == Some('\n') {
            self.timing.newline_delay
        } else {
            self.timing.char_delay
        };
        Some(TypewriterTick {
            text,
            click: next.is_some_and(|c| c != '\n'),
            delay,
        })
    }
}

/// Progress reported by a running typewriter task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypewriterMessage {
    /// A tick to display.
    Tick {
        /// Run that produced the tick.
        run: RunId,
        /// The tick itself.
        tick: TypewriterTick,
    },
    /// The run finished and its settle delay elapsed.
    Settled {
        /// Run that settled.
        run: RunId,
    },
}

impl TypewriterMessage {
    /// The run this message belongs to.
    #[must_use]
    pub const fn run(&self) -> RunId {
        match self {
            Self::Tick { run, .. } | Self::Settled { run } => *run,
        }
    }
}

/// Spawns typing runs for a fixed script.
#[derive(Debug, Clone)]
pub struct TypewriterRunner {
    script: Arc<str>,
    timing: TypingTiming,
}

impl TypewriterRunner {
    /// Creates a runner for `script`.
    #[must_use]
    pub fn new(script: impl Into<Arc<str>>, timing: TypingTiming) -> Self {
        Self {
            script: script.into(),
            timing,
        }
    }

    /// Starts a run on the current tokio runtime.
    ///
    /// Messages go to `tx` in script order. The task stops at the first of:
    /// cancellation, a closed channel, or the `Settled` message.
    pub fn spawn(&self, run: RunId, tx: mpsc::UnboundedSender<TypewriterMessage>) -> TypewriterHandle {
        let cancel = CancellationToken::new();
        let mut cursor = TypewriterCursor::new(Arc::clone(&self.script), self.timing);
        let timing = self.timing;
        let token = cancel.clone();

        tokio::spawn(async move {
            if !pause(&token, timing.start_delay).await {
                return;
            }
            while let Some(tick) = cursor.step() {
                let delay = tick.delay;
                trace!(run, index = cursor.index(), "typewriter tick");
                if tx.send(TypewriterMessage::Tick { run, tick }).is_err() {
                    return;
                }
                if !pause(&token, delay).await {
                    return;
                }
            }
            // The last tick's own delay has already elapsed; the settle delay
            // runs on top of it.
            if !pause(&token, timing.settle_delay).await {
                return;
            }
            debug!(run, "typewriter settled");
            let _ = tx.send(TypewriterMessage::Settled { run });
        });

        TypewriterHandle { run, cancel }
    }
}

/// Sleeps for `duration` unless cancelled first. Returns `false` on cancel.
async fn pause(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        () = token.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

/// Handle to a running typewriter task. Dropping it cancels the run.
#[derive(Debug)]
pub struct TypewriterHandle {
    run: RunId,
    cancel: CancellationToken,
}

impl TypewriterHandle {
    /// The run this handle controls.
    #[must_use]
    pub const fn run(&self) -> RunId {
        self.run
    }

    /// Stops the run. Idempotent.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            debug!(run = self.run, "typewriter cancelled");
            self.cancel.cancel();
        }
    }
}

impl Drop for TypewriterHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
