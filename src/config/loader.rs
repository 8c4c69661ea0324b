//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check against [`ConfigLimits`]
//! 2. Environment variable expansion (on raw text, before parsing)
//! 3. YAML parsing into [`ExperienceConfig`]
//! 4. Validation
//!
//! A file that parses to nothing (empty, or only comments) yields the
//! default experience.

use std::path::Path;

use tracing::debug;

use crate::config::schema::ExperienceConfig;
use crate::config::validation::validate;
use crate::error::{ConfigError, Severity, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Limits applied before a file is parsed.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum configuration file size in bytes.
    pub max_config_size: u64,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("VALENTINE_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: ExperienceConfig,

    /// Non-fatal findings (validation warnings, unset variables).
    pub warnings: Vec<ValidationIssue>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    limits: ConfigLimits,
}

impl ConfigLoader {
    /// Creates a loader with explicit limits.
    #[must_use]
    pub const fn new(limits: ConfigLimits) -> Self {
        Self { limits }
    }

    /// Creates a loader whose limits come from the environment.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads, expands, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or exceeds the size limit
    /// - A required environment variable is unset
    /// - YAML parsing fails
    /// - Validation reports errors
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > self.limits.max_config_size {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.limits.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let mut result = self.load_str(&raw, path)?;
        debug!(path = %path.display(), warnings = result.warnings.len(), "configuration loaded");
        result.warnings.sort_by_key(|w| w.path.clone());
        Ok(result)
    }

    /// Same pipeline as [`load`](Self::load) for text already in memory.
    /// `origin` is only used in messages.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file access errors.
    pub fn load_str(&self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new();
        let substituted = env_sub.substitute(raw, origin)?;
        let mut warnings = env_sub.warnings;

        let config = parse(&substituted, origin)?;

        let (errors, found): (Vec<_>, Vec<_>) = validate(&config)
            .into_iter()
            .partition(|issue| issue.severity == Severity::Error);
        if !errors.is_empty() {
            return Err(ConfigError::ValidationError {
                path: origin.display().to_string(),
                errors,
            });
        }
        warnings.extend(found);

        Ok(LoadResult { config, warnings })
    }
}

fn parse(text: &str, origin: &Path) -> Result<ExperienceConfig, ConfigError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;
    if value.is_null() {
        return Ok(ExperienceConfig::default());
    }
    serde_yaml::from_value(value).map_err(|e| ConfigError::ParseError {
        path: origin.to_path_buf(),
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    })
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw YAML text so substituted values still go through YAML type
/// inference.
struct EnvSubstitution {
    warnings: Vec<ValidationIssue>,
}

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Substitutes environment variables in raw YAML text.
    ///
    /// Supports:
    /// - `${VAR}` - expand to value (empty string if unset, with a warning)
    /// - `${VAR:-default}` - expand to default if unset
    /// - `${VAR:?message}` - fail if unset
    /// - `$$` - literal `$`
    fn substitute(&mut self, raw: &str, source: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let spec = VarSpec::parse(&mut chars).ok_or_else(|| ConfigError::ParseError {
                        path: source.to_path_buf(),
                        line: None,
                        message: "unclosed environment variable reference".to_string(),
                    })?;
                    match std::env::var(&spec.name) {
                        Ok(value) => result.push_str(&value),
                        Err(_) => match spec.fallback {
                            Fallback::Default(default) => result.push_str(&default),
                            Fallback::Required(_) => {
                                return Err(ConfigError::EnvVarNotSet {
                                    var: spec.name,
                                    path: source.to_path_buf(),
                                });
                            }
                            Fallback::Empty => self.warnings.push(ValidationIssue {
                                path: source.display().to_string(),
                                message: format!(
                                    "environment variable '{}' is not set, using empty string",
                                    spec.name
                                ),
                                severity: Severity::Warning,
                            }),
                        },
                    }
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }
}

/// What to do when a referenced variable is unset.
enum Fallback {
    Empty,
    Default(String),
    Required(String),
}

/// A parsed `${...}` reference.
struct VarSpec {
    name: String,
    fallback: Fallback,
}

impl VarSpec {
    /// Parses the remainder of a reference after `${`. `None` if unclosed.
    fn parse(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<Self> {
        let mut name = String::new();
        while let Some(c) = chars.next() {
            match c {
                '}' => {
                    return Some(Self {
                        name,
                        fallback: Fallback::Empty,
                    });
                }
                ':' if chars.peek() == Some(&'-') => {
                    chars.next();
                    let default = read_until_close(chars)?;
                    return Some(Self {
                        name,
                        fallback: Fallback::Default(default),
                    });
                }
                ':' if chars.peek() == Some(&'?') => {
                    chars.next();
                    let message = read_until_close(chars)?;
                    return Some(Self {
                        name,
                        fallback: Fallback::Required(message),
                    });
                }
                _ => name.push(c),
            }
        }
        None
    }
}

/// Reads up to the matching `}`, allowing nested braces.
fn read_until_close(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut value = String::new();
    let mut depth = 1;
    for c in chars.by_ref() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(value);
                }
            }
            _ => {}
        }
        value.push(c);
    }
    None
}

/// Parses an environment variable, falling back to `default`.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn origin() -> &'static Path {
        Path::new("test.yaml")
    }

    #[test]
    fn test_env_substitution_simple() {
        // PATH is always set
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute("path: ${PATH}", origin()).unwrap();
        assert!(!result.contains("${PATH}"));
        assert!(result.len() > "path: ".len());
    }

    #[test]
    fn test_env_substitution_default() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute("recipient: ${VALENTINE_TEST_UNSET_XYZ123:-Sam}", origin())
            .unwrap();
        assert_eq!(result, "recipient: Sam");
    }

    #[test]
    fn test_env_substitution_default_with_braces() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute("x: ${VALENTINE_TEST_UNSET_XYZ123:-{a}}", origin())
            .unwrap();
        assert_eq!(result, "x: {a}");
    }

    #[test]
    fn test_env_substitution_required_missing() {
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute("x: ${VALENTINE_TEST_REQUIRED_XYZ123:?needed}", origin());
        match result {
            Err(ConfigError::EnvVarNotSet { var, .. }) => {
                assert_eq!(var, "VALENTINE_TEST_REQUIRED_XYZ123");
            }
            other => panic!("expected EnvVarNotSet, got {other:?}"),
        }
    }

    #[test]
    fn test_env_substitution_escaped_dollar() {
        let mut sub = EnvSubstitution::new();
        assert_eq!(sub.substitute("price: $$100", origin()).unwrap(), "price: $100");
    }

    #[test]
    fn test_env_substitution_missing_warning() {
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute("x: ${VALENTINE_TEST_WARN_XYZ123}", origin()).unwrap();
        assert_eq!(result, "x: ");
        assert_eq!(sub.warnings.len(), 1);
        assert!(sub.warnings[0].message.contains("VALENTINE_TEST_WARN_XYZ123"));
    }

    #[test]
    fn test_env_substitution_unclosed() {
        let mut sub = EnvSubstitution::new();
        assert!(matches!(
            sub.substitute("x: ${OPEN", origin()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_empty_document_gives_defaults() {
        let loader = ConfigLoader::with_defaults();
        let result = loader.load_str("# nothing here\n", origin()).unwrap();
        assert_eq!(result.config, ExperienceConfig::default());
    }

    #[test]
    fn test_bom_is_stripped() {
        let loader = ConfigLoader::with_defaults();
        let result = loader.load_str("\u{feff}recipient: Sam\n", origin()).unwrap();
        assert_eq!(result.config.recipient, "Sam");
    }

    #[test]
    fn test_parse_error_has_line() {
        let loader = ConfigLoader::with_defaults();
        match loader.load_str("recipient: Sam\n  bad: [", origin()) {
            Err(ConfigError::ParseError { line, .. }) => assert!(line.is_some()),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_errors_block_loading() {
        let loader = ConfigLoader::with_defaults();
        match loader.load_str("rejection_lines: []\n", origin()) {
            Err(ConfigError::ValidationError { errors, .. }) => {
                assert!(errors.iter().any(|e| e.path == "rejection_lines"));
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_warnings_pass_through() {
        let loader = ConfigLoader::with_defaults();
        let result = loader.load_str("proposal_lines: []\n", origin()).unwrap();
        assert!(result.warnings.iter().any(|w| w.path == "proposal_lines"));
    }

    #[test]
    fn test_missing_file() {
        let loader = ConfigLoader::with_defaults();
        let err = loader.load(Path::new("/nonexistent/valentine.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_too_large() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recipient: {}", "x".repeat(64)).unwrap();
        let loader = ConfigLoader::new(ConfigLimits {
            max_config_size: 16,
        });
        let err = loader.load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { limit: 16, .. }));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recipient: Sam\nlayout:\n  max_items: 20").unwrap();
        let result = ConfigLoader::with_defaults().load(file.path()).unwrap();
        assert_eq!(result.config.recipient, "Sam");
        assert_eq!(result.config.layout.max_items, 20);
        assert_eq!(result.config.layout.min_items, 12);
    }

    #[test]
    fn test_config_limits_default() {
        assert!(ConfigLimits::default().max_config_size > 0);
    }
}
