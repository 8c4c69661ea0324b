//! Configuration schema.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields the stock experience. Durations are written the humantime way
//! (`"950ms"`, `"1s"`).

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::confetti::DEFAULT_COLORS;
use crate::layout::RainLayoutBuilder;
use crate::typewriter::TypingTiming;

// ============================================================================
// Root
// ============================================================================

/// Complete experience configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperienceConfig {
    /// Name shown in the header and on the acceptance card.
    pub recipient: String,
    /// Header label (e.g. `"Marianna.exe"`).
    pub title: String,
    /// Text typed during the boot phase.
    pub boot_script: String,
    /// Lines shown in the prompt phase.
    pub prompt_lines: Vec<String>,
    /// Lines of the proposal; the last one is highlighted.
    pub proposal_lines: Vec<String>,
    /// Messages picked at random when the reject action is used.
    pub rejection_lines: Vec<String>,
    /// Photo discovery.
    pub photos: PhotosConfig,
    /// Photo rain density.
    pub layout: LayoutConfig,
    /// Boot typing pace.
    pub typing: TypingConfig,
    /// Audio output.
    pub audio: AudioConfig,
    /// Confetti on acceptance.
    pub confetti: ConfettiConfig,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        let recipient = "Marianna Haddad".to_string();
        Self {
            title: "Marianna.exe".to_string(),
            boot_script: format!(
                "Bare Systems initialized\n\nDetecting primary user...\n{recipient} detected\n\nLoading shared history..."
            ),
            prompt_lines: lines(&["Shared history loaded.", "Would you like to view memories?"]),
            proposal_lines: vec![
                format!("{recipient},"),
                "You are my greatest partner.".to_string(),
                "My favorite person.".to_string(),
                "And the best thing I have ever built my life with.".to_string(),
                "Will you be my Valentine?".to_string(),
            ],
            rejection_lines: lines(&[
                "Nice try. The \u{201c}no\u{201d} button is decorative.",
                "System override: \u{201c}no\u{201d} is not an option.",
                "Access denied. Please choose \u{201c}yes.\u{201d}",
                "Cute. But \u{201c}no\u{201d} has been disabled.",
            ]),
            recipient,
            photos: PhotosConfig::default(),
            layout: LayoutConfig::default(),
            typing: TypingConfig::default(),
            audio: AudioConfig::default(),
            confetti: ConfettiConfig::default(),
        }
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

// ============================================================================
// Sections
// ============================================================================

/// Where photos come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    /// Directory scanned for images.
    pub dir: PathBuf,
    /// Prefix for the source references handed to the layout.
    pub url_prefix: String,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public/photos"),
            url_prefix: "/photos".to_string(),
        }
    }
}

/// Photo rain density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Sprites contributed by each photo before clamping.
    pub per_photo: usize,
    /// Lower bound on sprite count (when at least one photo exists).
    pub min_items: usize,
    /// Upper bound on sprite count.
    pub max_items: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            per_photo: 3,
            min_items: 12,
            max_items: 28,
        }
    }
}

impl LayoutConfig {
    /// Layout builder for these settings.
    #[must_use]
    pub fn builder(&self) -> RainLayoutBuilder {
        RainLayoutBuilder::new()
            .per_photo(self.per_photo)
            .bounds(self.min_items, self.max_items)
    }
}

/// Boot typing pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypingConfig {
    /// Pause before the first character.
    #[serde(with = "duration_str")]
    pub start_delay: Duration,
    /// Pause after each ordinary character.
    #[serde(with = "duration_str")]
    pub char_delay: Duration,
    /// Pause after each newline.
    #[serde(with = "duration_str")]
    pub newline_delay: Duration,
    /// Pause between the end of typing and the prompt.
    #[serde(with = "duration_str")]
    pub settle_delay: Duration,
}

impl Default for TypingConfig {
    fn default() -> Self {
        let timing = TypingTiming::default();
        Self {
            start_delay: timing.start_delay,
            char_delay: timing.char_delay,
            newline_delay: timing.newline_delay,
            settle_delay: timing.settle_delay,
        }
    }
}

impl From<TypingConfig> for TypingTiming {
    fn from(config: TypingConfig) -> Self {
        Self {
            start_delay: config.start_delay,
            char_delay: config.char_delay,
            newline_delay: config.newline_delay,
            settle_delay: config.settle_delay,
        }
    }
}

/// Audio output selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AudioBackendKind {
    /// Terminal bell on the success chime.
    #[default]
    Bell,
    /// Capture synthesized PCM to a WAV file.
    Wav,
    /// No audio.
    Silent,
}

/// Audio settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Which backend to use.
    pub backend: AudioBackendKind,
    /// Start with audio running, skipping the wait for a first keypress.
    pub autoplay: bool,
    /// Ring the bell for keystrokes too (bell backend only).
    pub bell_on_click: bool,
    /// Output path for the WAV backend.
    pub wav_path: Option<PathBuf>,
    /// Sample rate used for synthesis.
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            backend: AudioBackendKind::default(),
            autoplay: false,
            bell_on_click: false,
            wav_path: None,
            sample_rate: 44_100,
        }
    }
}

/// Confetti settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfettiConfig {
    /// Whether bursts are drawn at all.
    pub enabled: bool,
    /// Palette shared by both bursts, as `#rrggbb`.
    pub colors: Vec<String>,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colors: lines(DEFAULT_COLORS),
        }
    }
}

// ============================================================================
// Duration (de)serialization
// ============================================================================

/// Serializes a `Duration` as a humantime string.
mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config: ExperienceConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ExperienceConfig::default());
    }

    #[test]
    fn test_default_script_mentions_recipient() {
        let config = ExperienceConfig::default();
        assert!(config.boot_script.contains("Marianna Haddad detected"));
        assert_eq!(config.rejection_lines.len(), 4);
        assert_eq!(config.proposal_lines.last().unwrap(), "Will you be my Valentine?");
    }

    #[test]
    fn test_durations_parse_humantime() {
        let config: ExperienceConfig =
            serde_yaml::from_str("typing:\n  char_delay: 10ms\n  settle_delay: 2s\n").unwrap();
        assert_eq!(config.typing.char_delay, Duration::from_millis(10));
        assert_eq!(config.typing.settle_delay, Duration::from_secs(2));
        assert_eq!(config.typing.newline_delay, Duration::from_millis(220));
    }

    #[test]
    fn test_bad_duration_rejected() {
        let result: Result<ExperienceConfig, _> =
            serde_yaml::from_str("typing:\n  char_delay: soon\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ExperienceConfig, _> = serde_yaml::from_str("recipent: typo\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_round_trips_durations() {
        let yaml = serde_yaml::to_string(&ExperienceConfig::default()).unwrap();
        assert!(yaml.contains("settle_delay: 950ms"));
        let back: ExperienceConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, ExperienceConfig::default());
    }

    #[test]
    fn test_audio_backend_names() {
        let audio: AudioConfig = serde_yaml::from_str("backend: wav\nwav_path: out.wav\n").unwrap();
        assert_eq!(audio.backend, AudioBackendKind::Wav);
        assert_eq!(audio.wav_path, Some(PathBuf::from("out.wav")));
    }

    #[test]
    fn test_layout_builder_uses_bounds() {
        let layout = LayoutConfig {
            per_photo: 1,
            min_items: 2,
            max_items: 3,
        };
        assert_eq!(layout.builder().item_count(1), 2);
        assert_eq!(layout.builder().item_count(10), 3);
    }
}
