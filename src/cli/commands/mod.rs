//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod layout;
pub mod run;
pub mod validate;
pub mod version;

use std::path::Path;

use tracing::warn;

use crate::cli::args::{Cli, Commands};
use crate::config::{ConfigLoader, ExperienceConfig};
use crate::error::{ExitCode, ValentineError};
use crate::observability::StopReason;
use crate::session::ShutdownSignal;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// Returns the process exit code for commands that finish normally.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, shutdown: &ShutdownSignal) -> Result<i32, ValentineError> {
    match cli.command {
        Commands::Run(args) => {
            let reason = run::run(&args, shutdown).await?;
            Ok(exit_code_for(reason))
        }
        Commands::Layout(args) => layout::run(&args).map(|()| ExitCode::SUCCESS),
        Commands::Validate(args) => validate::run(&args).map(|()| ExitCode::SUCCESS),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Exit code for a session that ended without error.
#[must_use]
pub const fn exit_code_for(reason: StopReason) -> i32 {
    match reason {
        StopReason::Quit | StopReason::InputClosed => ExitCode::SUCCESS,
        StopReason::Interrupted => ExitCode::INTERRUPTED,
        StopReason::Terminated => ExitCode::TERMINATED,
    }
}

/// Loads `path`, or the built-in experience when there is none.
/// Warnings are logged.
fn load_experience(path: Option<&Path>) -> Result<ExperienceConfig, ValentineError> {
    let Some(path) = path else {
        return Ok(ExperienceConfig::default());
    };
    let result = ConfigLoader::with_defaults().load(path)?;
    for warning in &result.warnings {
        warn!(field = %warning.path, "{}", warning.message);
    }
    Ok(result.config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_exit_codes_for_stop_reasons() {
        assert_eq!(exit_code_for(StopReason::Quit), ExitCode::SUCCESS);
        assert_eq!(exit_code_for(StopReason::InputClosed), ExitCode::SUCCESS);
        assert_eq!(exit_code_for(StopReason::Interrupted), 130);
        assert_eq!(exit_code_for(StopReason::Terminated), 143);
    }

    #[test]
    fn test_load_experience_defaults_without_file() {
        let config = load_experience(None).unwrap();
        assert_eq!(config, ExperienceConfig::default());
    }

    #[test]
    fn test_load_experience_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recipient: Sam").unwrap();
        let config = load_experience(Some(file.path())).unwrap();
        assert_eq!(config.recipient, "Sam");
    }

    #[test]
    fn test_load_experience_missing_file() {
        let err = load_experience(Some(Path::new("/nonexistent/valentine.yaml"))).unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }
}
