//! Interactive session driver.
//!
//! One task owns the controller and multiplexes everything that can change
//! it: terminal input, typing progress, confetti bursts, the frame clock
//! and process shutdown. Nothing else mutates experience state.

pub mod keymap;

use std::io;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crossterm::event::{Event as TermEvent, EventStream};
use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::confetti::{ChannelConfetti, ConfettiBurst};
use crate::error::TerminalError;
use crate::observability::StopReason;
use crate::phase::{ExperienceController, Phase};
use crate::render::{FrameBuffer, ParticleField, TerminalGuard, paint, present};
use crate::typewriter::TypewriterMessage;

pub use keymap::{Action, actions};

/// Roughly 30 frames per second.
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Process-wide stop request carrying the first reason given.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<StopReason>>,
}

impl ShutdownSignal {
    /// A signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Only the first reason is kept.
    pub fn trigger(&self, reason: StopReason) {
        let _ = self.reason.set(reason);
        self.token.cancel();
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown is requested.
    pub async fn triggered(&self) -> StopReason {
        self.token.cancelled().await;
        self.reason.get().copied().unwrap_or(StopReason::Interrupted)
    }
}

/// Animation time restarts whenever the phase changes, so the photo rain
/// begins from the top when the montage opens.
#[derive(Debug)]
struct PhaseClock {
    phase: Phase,
    since: Instant,
}

impl PhaseClock {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            since: Instant::now(),
        }
    }

    fn elapsed(&mut self, phase: Phase) -> f64 {
        if phase != self.phase {
            self.phase = phase;
            self.since = Instant::now();
        }
        self.since.elapsed().as_secs_f64()
    }
}

/// A running experience bound to the terminal.
#[derive(Debug)]
pub struct Session {
    controller: ExperienceController,
    typing_rx: UnboundedReceiver<TypewriterMessage>,
    confetti_rx: Option<UnboundedReceiver<ConfettiBurst>>,
    field: ParticleField,
}

impl Session {
    /// Wraps a controller. With `confetti` on, bursts are routed to the
    /// terminal particle field.
    #[must_use]
    pub fn new(
        mut controller: ExperienceController,
        typing_rx: UnboundedReceiver<TypewriterMessage>,
        confetti: bool,
    ) -> Self {
        let confetti_rx = confetti.then(|| {
            let (sink, rx) = ChannelConfetti::new();
            controller.load_confetti(Box::new(sink));
            rx
        });
        Self {
            controller,
            typing_rx,
            confetti_rx,
            field: ParticleField::default(),
        }
    }

    /// Takes over the terminal and runs until quit, input end or
    /// `shutdown`. The terminal is restored and the controller stopped on
    /// every path out.
    ///
    /// # Errors
    ///
    /// Returns a [`TerminalError`] if the terminal cannot be set up, read
    /// or drawn to.
    pub async fn run(mut self, shutdown: &ShutdownSignal) -> Result<StopReason, TerminalError> {
        let mut guard = TerminalGuard::enter()?;
        let (width, height) = TerminalGuard::size()?;
        self.controller.start();

        let outcome = self.drive(shutdown, width, height).await;
        guard.restore();

        let reason = outcome.as_ref().map_or(StopReason::InputClosed, |reason| *reason);
        self.controller.shutdown(reason);
        info!(%reason, "session ended");
        outcome
    }

    async fn drive(
        &mut self,
        shutdown: &ShutdownSignal,
        width: u16,
        height: u16,
    ) -> Result<StopReason, TerminalError> {
        let Self {
            controller,
            typing_rx,
            confetti_rx,
            field,
        } = self;
        let mut terminal_events = EventStream::new();
        let mut frame = FrameBuffer::new(width, height);
        let mut stdout = io::stdout();
        let mut clock = PhaseClock::new(controller.phase());
        let mut ticker = tokio::time::interval(FRAME_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                reason = shutdown.triggered() => return Ok(reason),

                next = terminal_events.next() => match next {
                    Some(Ok(TermEvent::Resize(w, h))) => {
                        debug!(width = w, height = h, "terminal resized");
                        frame.reset(w, h);
                    }
                    Some(Ok(event)) => {
                        for action in actions(controller.phase(), &event) {
                            match action {
                                Action::Input(input) => controller.handle(input),
                                Action::Replay => controller.restart_typing(),
                                Action::Quit => return Ok(StopReason::Quit),
                            }
                        }
                    }
                    Some(Err(e)) => return Err(TerminalError::Draw(e)),
                    None => return Ok(StopReason::InputClosed),
                },

                Some(message) = typing_rx.recv() => controller.handle_typewriter(message),

                Some(burst) = next_burst(confetti_rx.as_mut()) => {
                    field.spawn(&burst, frame.width(), frame.height());
                }

                _ = ticker.tick() => {
                    field.step();
                    let elapsed = clock.elapsed(controller.phase());
                    paint(&controller.view(), elapsed, &mut frame);
                    field.draw(&mut frame);
                    present(&frame, &mut stdout)?;
                }
            }
        }
    }
}

async fn next_burst(rx: Option<&mut UnboundedReceiver<ConfettiBurst>>) -> Option<ConfettiBurst> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
