//! Read-only snapshot handed to the renderer.

use crate::layout::RainItem;

use super::machine::Phase;

/// Everything needed to draw one frame, borrowed from the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceView<'a> {
    /// Header label.
    pub title: &'a str,
    /// Whether an audio context is producing sound.
    pub audio_running: bool,
    /// Phase-specific content.
    pub body: PhaseView<'a>,
}

impl ExperienceView<'_> {
    /// Phase the body belongs to.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.body.phase()
    }
}

/// Phase-specific content.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseView<'a> {
    /// Boot terminal.
    Boot {
        /// Text typed so far.
        typed: &'a str,
        /// Whether the gate is still closed (show the "press any key" hint).
        waiting: bool,
    },
    /// Invitation to view memories.
    Prompt {
        /// Lines to show.
        lines: &'a [String],
    },
    /// Photo rain. An empty slice means the fallback notice is shown.
    Memories {
        /// Sprites to animate.
        items: &'a [RainItem],
        /// Directory photos are read from, for the fallback notice.
        photo_dir: &'a str,
    },
    /// The proposal.
    Ask {
        /// Proposal lines; the last one is highlighted.
        lines: &'a [String],
        /// Current rejection message, if any.
        rejection: Option<&'a str>,
    },
    /// Acceptance card.
    Accepted {
        /// Shown as the owner.
        recipient: &'a str,
        /// Whether the success cue actually sounded.
        tone_played: bool,
        /// Whether confetti was drawn.
        confetti_sent: bool,
    },
}

impl PhaseView<'_> {
    /// Phase this content belongs to.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Boot { .. } => Phase::Boot,
            Self::Prompt { .. } => Phase::Prompt,
            Self::Memories { .. } => Phase::Memories,
            Self::Ask { .. } => Phase::Ask,
            Self::Accepted { .. } => Phase::Accepted,
        }
    }

    /// Whether the memories fallback notice is shown.
    #[must_use]
    pub const fn shows_fallback(&self) -> bool {
        matches!(self, Self::Memories { items, .. } if items.is_empty())
    }
}
