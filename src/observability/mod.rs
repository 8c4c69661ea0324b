//! Observability module
//!
//! Logging and the structured event stream.

pub mod events;
pub mod logging;

pub use events::{Event, EventEmitter, StopReason};
pub use logging::{LogFormat, LogTarget, init_logging};
