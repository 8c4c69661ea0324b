//! CLI argument definitions
//!
//! All Clap derive structs for `valentine` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::AudioBackendKind;

// ============================================================================
// Root CLI
// ============================================================================

/// A scripted valentine, played in the terminal.
#[derive(Parser, Debug)]
#[command(name = "valentine", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "VALENTINE_COLOR")]
    pub color: ColorChoice,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play the experience in this terminal.
    Run(RunArgs),

    /// Print the photo rain layout without starting the experience.
    Layout(LayoutArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a YAML experience file. Built-in content is used without one.
    #[arg(short, long, env = "VALENTINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Photo directory (overrides `photos.dir`).
    #[arg(short, long, env = "VALENTINE_PHOTOS")]
    pub photos: Option<PathBuf>,

    /// Audio backend (overrides `audio.backend`).
    #[arg(long)]
    pub audio: Option<AudioBackendKind>,

    /// WAV capture path for the `wav` backend.
    #[arg(long)]
    pub wav: Option<PathBuf>,

    /// Start with audio running instead of waiting for the first key.
    #[arg(long)]
    pub autoplay: bool,

    /// Disable confetti.
    #[arg(long)]
    pub no_confetti: bool,

    /// Append lifecycle events as JSON lines to this file.
    #[arg(long, env = "VALENTINE_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Write logs to this file. The terminal is busy, so logs are
    /// discarded without it.
    #[arg(long, env = "VALENTINE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Arguments for `layout`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Path to a YAML experience file.
    #[arg(short, long, env = "VALENTINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Photo directory (overrides `photos.dir`).
    #[arg(short, long)]
    pub photos: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
