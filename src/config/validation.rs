//! Configuration validation
//!
//! Runs on a fully deserialized [`ExperienceConfig`] and collects every
//! issue instead of stopping at the first.

use crate::audio::tone::MIN_SAMPLE_RATE;
use crate::config::schema::{AudioBackendKind, ExperienceConfig};
use crate::error::{Severity, ValidationIssue};

/// Validates `config`, returning errors and warnings together.
#[must_use]
pub fn validate(config: &ExperienceConfig) -> Vec<ValidationIssue> {
    let mut validator = Validator::default();
    validator.validate_text(config);
    validator.validate_layout(config);
    validator.validate_audio(config);
    validator.validate_confetti(config);
    validator.issues
}

#[derive(Debug, Default)]
struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    fn validate_text(&mut self, config: &ExperienceConfig) {
        if config.boot_script.trim().is_empty() {
            self.add_error("boot_script", "boot script cannot be empty");
        }
        if config.rejection_lines.is_empty() {
            self.add_error("rejection_lines", "at least one rejection line is required");
        }
        for (i, line) in config.rejection_lines.iter().enumerate() {
            if line.trim().is_empty() {
                self.add_error(&format!("rejection_lines[{i}]"), "rejection line is blank");
            }
        }
        if config.proposal_lines.is_empty() {
            self.add_warning("proposal_lines", "proposal is empty; the ask screen shows only buttons");
        }
        if config.recipient.trim().is_empty() {
            self.add_warning("recipient", "recipient is empty");
        }
    }

    fn validate_layout(&mut self, config: &ExperienceConfig) {
        let layout = &config.layout;
        if layout.per_photo == 0 {
            self.add_error("layout.per_photo", "per_photo must be at least 1");
        }
        if layout.min_items > layout.max_items {
            self.add_error(
                "layout.min_items",
                &format!(
                    "min_items ({}) is greater than max_items ({})",
                    layout.min_items, layout.max_items
                ),
            );
        }
        if layout.max_items == 0 {
            self.add_warning("layout.max_items", "max_items is 0; no photos will fall");
        }
    }

    fn validate_audio(&mut self, config: &ExperienceConfig) {
        let audio = &config.audio;
        if audio.sample_rate < MIN_SAMPLE_RATE {
            self.add_error(
                "audio.sample_rate",
                &format!("sample rate must be at least {MIN_SAMPLE_RATE} Hz"),
            );
        }
        if audio.backend == AudioBackendKind::Wav && audio.wav_path.is_none() {
            self.add_error("audio.wav_path", "the wav backend needs an output path");
        }
        if audio.backend != AudioBackendKind::Wav && audio.wav_path.is_some() {
            self.add_warning("audio.wav_path", "wav_path is ignored unless backend is wav");
        }
    }

    fn validate_confetti(&mut self, config: &ExperienceConfig) {
        let confetti = &config.confetti;
        if confetti.enabled && confetti.colors.is_empty() {
            self.add_error("confetti.colors", "at least one colour is required");
        }
        for (i, color) in confetti.colors.iter().enumerate() {
            if !is_hex_color(color) {
                self.add_error(
                    &format!("confetti.colors[{i}]"),
                    &format!("'{color}' is not a #rrggbb colour"),
                );
            }
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.push(path, message, Severity::Error);
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.push(path, message, Severity::Warning);
    }

    fn push(&mut self, path: &str, message: &str, severity: Severity) {
        self.issues.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity,
        });
    }
}

/// `#rrggbb`, case-insensitive.
#[must_use]
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
