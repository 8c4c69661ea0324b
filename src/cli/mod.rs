//! Command-line interface.
//!
//! - [`args`]: clap definitions
//! - [`commands`]: one handler per subcommand

pub mod args;
pub mod commands;
