//! Logging initialization.
//!
//! Structured logging via `tracing` with human-readable and JSON output,
//! configurable verbosity, and an environment override via
//! `VALENTINE_LOG_LEVEL`. The interactive session owns the terminal, so
//! its logs go to a file or nowhere.

use std::fs::File;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Standard error (non-interactive commands).
    #[default]
    Stderr,
    /// Appended to a file.
    File(PathBuf),
    /// Discarded.
    Off,
}

/// Maps a verbosity level to a tracing directive string.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"` (saturates)
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initializes the global tracing subscriber.
///
/// If `VALENTINE_LOG_LEVEL` is set it takes precedence over `verbosity`.
/// Uses `try_init()` so calling this more than once (e.g. in tests) is safe.
///
/// # Errors
///
/// Returns an I/O error if a log file target cannot be opened.
pub fn init_logging(
    format: LogFormat,
    verbosity: u8,
    color: ColorChoice,
    target: &LogTarget,
) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_env("VALENTINE_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));
    let show_target = verbosity >= 2;

    let file = match target {
        LogTarget::Stderr => None,
        LogTarget::File(path) => Some(File::options().create(true).append(true).open(path)?),
        LogTarget::Off => return Ok(()),
    };

    let use_ansi = file.is_none()
        && match color {
            ColorChoice::Auto => {
                std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(show_target);

    // Each writer/format pair is a distinct subscriber type.
    let _ = match (format, file) {
        (LogFormat::Human, None) => builder
            .with_ansi(use_ansi)
            .with_writer(std::io::stderr)
            .try_init(),
        (LogFormat::Human, Some(file)) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        (LogFormat::Json, None) => builder.json().with_writer(std::io::stderr).try_init(),
        (LogFormat::Json, Some(file)) => builder.json().with_writer(Mutex::new(file)).try_init(),
    };
    Ok(())
}
