//! Pure phase state machine.
//!
//! [`StateMachine::transition`] maps `(state, input)` to the next state and
//! the side effects to perform. It never performs them; that is the
//! controller's job, which keeps every rule here testable without timers,
//! audio or a terminal.

use serde::Serialize;
use tracing::debug;

use crate::audio::AudioCue;
use crate::confetti::BurstKind;

/// Phase of the experience. Progresses strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Boot script typing.
    #[default]
    Boot,
    /// Invitation to view memories.
    Prompt,
    /// Photo rain.
    Memories,
    /// The proposal.
    Ask,
    /// Terminal acceptance screen.
    Accepted,
}

impl Phase {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// The phase that precedes this one (Boot for Boot).
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Boot | Self::Prompt => Self::Boot,
            Self::Memories => Self::Prompt,
            Self::Ask => Self::Memories,
            Self::Accepted => Self::Ask,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boot => write!(f, "boot"),
            Self::Prompt => write!(f, "prompt"),
            Self::Memories => write!(f, "memories"),
            Self::Ask => write!(f, "ask"),
            Self::Accepted => write!(f, "accepted"),
        }
    }
}

/// What unlocked the boot gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateSource {
    /// First key press or mouse-down.
    Interaction,
    /// The audio context was already running when the experience mounted.
    AudioRunning,
}

/// Which affirmative action was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptChoice {
    /// "Yes".
    Yes,
    /// "Absolutely".
    Absolutely,
}

/// An input to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Boot gate opened.
    BootGate(GateSource),
    /// The typing run finished and its settle delay elapsed.
    TypingSettled,
    /// "View memories" action.
    ViewMemories,
    /// "Continue" action.
    Continue,
    /// Affirmative action.
    Accept(AcceptChoice),
    /// Negative action.
    Reject,
}

/// A side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Start (or restart) the boot typing run.
    StartTyping,
    /// Stop any typing run.
    StopTyping,
    /// Play an audio cue.
    PlayCue(AudioCue),
    /// Fire a confetti burst.
    FireConfetti(BurstKind),
    /// Pick and show a rejection message.
    ShowRejection,
    /// Hide the rejection message.
    ClearRejection,
    /// A new phase was entered.
    PhaseEntered(Phase),
}

/// Outcome of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the input.
    pub next: StateMachine,
    /// Effects to execute, in order.
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: StateMachine) -> Self {
        Self {
            next: state,
            effects: Vec::new(),
        }
    }

    fn enter(state: StateMachine, phase: Phase, mut effects: Vec<Effect>) -> Self {
        effects.push(Effect::PhaseEntered(phase));
        Self {
            next: StateMachine { phase, ..state },
            effects,
        }
    }
}

/// Machine state: the phase plus whether the boot gate has opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateMachine {
    phase: Phase,
    boot_ready: bool,
}

impl StateMachine {
    /// Initial state: Boot, gate closed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Boot,
            boot_ready: false,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the boot gate has opened.
    #[must_use]
    pub const fn boot_ready(&self) -> bool {
        self.boot_ready
    }

    /// Computes the transition for `input`. Does not modify `self`.
    #[must_use]
    pub fn transition(&self, input: Input) -> Transition {
        let state = *self;
        match (state.phase, input) {
            (Phase::Boot, Input::BootGate(_)) if !state.boot_ready => Transition {
                next: Self {
                    boot_ready: true,
                    ..state
                },
                effects: vec![Effect::StartTyping],
            },
            (Phase::Boot, Input::TypingSettled) if state.boot_ready => {
                Transition::enter(state, Phase::Prompt, vec![Effect::StopTyping])
            }
            (Phase::Prompt, Input::ViewMemories) => Transition::enter(state, Phase::Memories, Vec::new()),
            (Phase::Memories, Input::Continue) => Transition::enter(state, Phase::Ask, Vec::new()),
            (Phase::Ask, Input::Accept(_)) => Transition::enter(
                state,
                Phase::Accepted,
                vec![
                    Effect::ClearRejection,
                    Effect::PlayCue(AudioCue::Success),
                    Effect::FireConfetti(BurstKind::Primary),
                    Effect::FireConfetti(BurstKind::Secondary),
                ],
            ),
            (Phase::Ask, Input::Reject) => Transition {
                next: state,
                effects: vec![Effect::ShowRejection],
            },
            (phase, input) => {
                debug!(%phase, ?input, "input ignored");
                Transition::unchanged(state)
            }
        }
    }

    /// Applies `input` in place and returns the effects.
    pub fn apply(&mut self, input: Input) -> Vec<Effect> {
        let Transition { next, effects } = self.transition(input);
        *self = next;
        effects
    }
}
