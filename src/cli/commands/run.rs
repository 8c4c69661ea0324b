//! `valentine run`
//!
//! Builds the experience from configuration plus command-line overrides
//! and hands it to the interactive session.

use std::sync::Arc;

use tracing::{info, warn};

use crate::audio::{AudioBackend, AudioContext, AudioHandle, BellBackend, SilentBackend, WavBackend};
use crate::cli::args::RunArgs;
use crate::config::{AudioBackendKind, AudioConfig, ExperienceConfig, validate};
use crate::error::{ConfigError, Severity, ValentineError};
use crate::observability::{EventEmitter, StopReason};
use crate::phase::ExperienceController;
use crate::photos::discover_photos;
use crate::session::{Session, ShutdownSignal};

/// Plays the experience until it is quit or `shutdown` fires.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the events file cannot
/// be opened, or the terminal cannot be used.
pub async fn run(args: &RunArgs, shutdown: &ShutdownSignal) -> Result<StopReason, ValentineError> {
    let mut config = super::load_experience(args.config.as_deref())?;
    apply_overrides(&mut config, args)?;

    let errors: Vec<_> = validate(&config)
        .into_iter()
        .filter(|issue| issue.severity == Severity::Error)
        .collect();
    if !errors.is_empty() {
        return Err(ConfigError::ValidationError {
            path: "<command line>".to_string(),
            errors,
        }
        .into());
    }

    let photos = discover_photos(&config.photos.dir, &config.photos.url_prefix);
    info!(count = photos.len(), dir = %config.photos.dir.display(), "photos discovered");

    let events = match &args.events_file {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };
    let audio = mount_audio(&config.audio);

    let (mut controller, typing_rx) = ExperienceController::new(&config, audio, Arc::new(events));
    controller.set_photos(photos);

    let session = Session::new(controller, typing_rx, config.confetti.enabled);
    Ok(session.run(shutdown).await?)
}

/// Folds command-line flags into `config`.
fn apply_overrides(config: &mut ExperienceConfig, args: &RunArgs) -> Result<(), ValentineError> {
    if let Some(dir) = &args.photos {
        config.photos.dir.clone_from(dir);
    }
    if let Some(backend) = args.audio {
        config.audio.backend = backend;
    }
    if let Some(path) = &args.wav {
        if config.audio.backend != AudioBackendKind::Wav {
            return Err(ValentineError::Usage(
                "--wav needs the wav audio backend (--audio wav)".to_string(),
            ));
        }
        config.audio.wav_path = Some(path.clone());
    }
    config.audio.autoplay |= args.autoplay;
    if args.no_confetti {
        config.confetti.enabled = false;
    }
    Ok(())
}

/// Acquires the configured audio output. A WAV file that cannot be
/// created leaves the experience without audio rather than failing it.
fn mount_audio(config: &AudioConfig) -> AudioHandle {
    AudioHandle::mount(|| {
        let backend: Box<dyn AudioBackend> = match config.backend {
            AudioBackendKind::Bell => Box::new(BellBackend::stderr(config.bell_on_click)),
            AudioBackendKind::Wav => {
                let path = config.wav_path.as_deref()?;
                match WavBackend::create(path, config.sample_rate) {
                    Ok(backend) => Box::new(backend),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "WAV capture unavailable");
                        return None;
                    }
                }
            }
            AudioBackendKind::Silent => Box::new(SilentBackend),
        };
        Some(AudioContext::new(backend, config.autoplay))
    })
}
