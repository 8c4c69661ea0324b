//! `valentine validate`
//!
//! Checks configuration files without starting anything.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, Severity, ValentineError, ValidationIssue};

#[derive(Debug, Serialize)]
struct IssueReport {
    path: String,
    message: String,
    severity: &'static str,
}

impl From<&ValidationIssue> for IssueReport {
    fn from(issue: &ValidationIssue) -> Self {
        Self {
            path: issue.path.clone(),
            message: issue.message.clone(),
            severity: match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct FileReport {
    file: PathBuf,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
    issues: Vec<IssueReport>,
}

/// Validates every file and reports all of them before failing.
///
/// # Errors
///
/// Returns [`ValentineError::ValidationFailed`] if any file is invalid
/// (including warnings under `--strict`).
pub fn run(args: &ValidateArgs) -> Result<(), ValentineError> {
    let loader = ConfigLoader::with_defaults();
    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check_file(&loader, path, args.strict))
        .collect();

    let mut out = std::io::stdout().lock();
    match args.format {
        OutputFormat::Human => write_human(&mut out, &reports)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &reports)?;
            writeln!(out)?;
        }
    }

    let failed = reports.iter().filter(|r| !r.valid).count();
    if failed > 0 {
        return Err(ValentineError::ValidationFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

fn check_file(loader: &ConfigLoader, path: &Path, strict: bool) -> FileReport {
    tracing::info!(file = %path.display(), "validating configuration");
    let (failure, issues) = match loader.load(path) {
        Ok(result) => (None, result.warnings),
        Err(ConfigError::ValidationError { errors, .. }) => (None, errors),
        Err(e) => (Some(e.to_string()), Vec::new()),
    };
    let valid = failure.is_none()
        && issues
            .iter()
            .all(|issue| issue.severity == Severity::Warning && !strict);
    FileReport {
        file: path.to_path_buf(),
        valid,
        failure,
        issues: issues.iter().map(IssueReport::from).collect(),
    }
}

fn write_human(out: &mut impl Write, reports: &[FileReport]) -> std::io::Result<()> {
    for report in reports {
        let status = if report.valid { "ok" } else { "FAIL" };
        writeln!(out, "{status:<4} {}", report.file.display())?;
        if let Some(failure) = &report.failure {
            writeln!(out, "     {failure}")?;
        }
        for issue in &report.issues {
            writeln!(out, "     {}: {} at {}", issue.severity, issue.message, issue.path)?;
        }
    }
    Ok(())
}
