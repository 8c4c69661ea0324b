//! Terminal input to experience actions.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::phase::{AcceptChoice, GateSource, Input, Phase};

/// What a terminal event asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Feed an input to the machine.
    Input(Input),
    /// Replay the boot script from the start.
    Replay,
    /// End the session.
    Quit,
}

/// Maps one terminal event to actions, in the order they apply.
///
/// Every key press and mouse-down counts as an interaction for the boot
/// gate; quit keys never do.
#[must_use]
pub fn actions(phase: Phase, event: &Event) -> Vec<Action> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => key_actions(phase, key),
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(_),
            ..
        }) => vec![gate()],
        _ => Vec::new(),
    }
}

const fn gate() -> Action {
    Action::Input(Input::BootGate(GateSource::Interaction))
}

fn key_actions(phase: Phase, key: &KeyEvent) -> Vec<Action> {
    if is_quit(key) {
        return vec![Action::Quit];
    }
    let action = match (phase, key.code) {
        (Phase::Boot, KeyCode::Char('r')) => Some(Action::Replay),
        (Phase::Prompt, KeyCode::Enter | KeyCode::Char('m')) => Some(Action::Input(Input::ViewMemories)),
        (Phase::Memories, KeyCode::Enter | KeyCode::Char('c')) => Some(Action::Input(Input::Continue)),
        (Phase::Ask, KeyCode::Char('y')) => Some(Action::Input(Input::Accept(AcceptChoice::Yes))),
        (Phase::Ask, KeyCode::Char('a')) => {
            Some(Action::Input(Input::Accept(AcceptChoice::Absolutely)))
        }
        (Phase::Ask, KeyCode::Char('n')) => Some(Action::Input(Input::Reject)),
        _ => None,
    };
    std::iter::once(gate()).chain(action).collect()
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
