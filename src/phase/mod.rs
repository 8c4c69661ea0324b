//! Experience phases.
//!
//! - [`machine`]: pure `(state, input) -> (state, effects)` transitions
//! - [`controller`]: executes effects against audio, confetti, typing
//! - [`view`]: borrowed snapshot for rendering

pub mod controller;
pub mod machine;
pub mod view;

pub use controller::ExperienceController;
pub use machine::{AcceptChoice, Effect, GateSource, Input, Phase, StateMachine, Transition};
pub use view::{ExperienceView, PhaseView};
