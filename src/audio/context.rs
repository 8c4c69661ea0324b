//! Scoped audio context.
//!
//! [`AudioContext`] owns a backend and synthesizes cues into it while
//! running. [`AudioHandle`] is what the experience holds: it may be empty
//! (no audio on this platform), and it releases its context exactly once.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::AudioCue;
use super::backend::AudioBackend;
use super::tone::ToneSequence;

/// Lifecycle state of an [`AudioContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Created but not yet allowed to sound (waiting for a user gesture).
    Suspended,
    /// Producing output.
    Running,
    /// Released; no further output.
    Closed,
}

/// A live audio context bound to one backend.
pub struct AudioContext {
    backend: Box<dyn AudioBackend>,
    state: ContextState,
    sample_rng: StdRng,
}

impl AudioContext {
    /// Creates a context. With `autoplay` the context starts running,
    /// otherwise it waits for [`resume`](Self::resume).
    #[must_use]
    pub fn new(backend: Box<dyn AudioBackend>, autoplay: bool) -> Self {
        let state = if autoplay {
            ContextState::Running
        } else {
            ContextState::Suspended
        };
        Self {
            backend,
            state,
            sample_rng: StdRng::from_os_rng(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ContextState {
        self.state
    }

    /// Moves a suspended context to running. No effect once closed.
    pub fn resume(&mut self) {
        if self.state == ContextState::Suspended {
            debug!(backend = self.backend.name(), "audio context resumed");
            self.state = ContextState::Running;
        }
    }

    /// Synthesizes and plays `cue` if the context is running.
    ///
    /// Backend failures are logged and otherwise ignored.
    pub fn emit(&mut self, cue: AudioCue) {
        if self.state != ContextState::Running {
            return;
        }
        let tones = match cue {
            AudioCue::Click => ToneSequence::click(&mut self.sample_rng),
            AudioCue::Success => ToneSequence::success(),
        };
        if let Err(e) = self.backend.play(cue, &tones) {
            debug!(backend = self.backend.name(), %cue, error = %e, "audio cue dropped");
        }
    }

    /// Releases the backend. Subsequent calls are no-ops.
    pub fn close(&mut self) {
        if self.state == ContextState::Closed {
            return;
        }
        self.state = ContextState::Closed;
        match self.backend.close() {
            Ok(()) => info!(backend = self.backend.name(), "audio context closed"),
            Err(e) => warn!(backend = self.backend.name(), error = %e, "audio context close failed"),
        }
    }
}

impl Drop for AudioContext {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for AudioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioContext")
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// The experience's view of audio: possibly absent, released once.
#[derive(Debug, Default)]
pub struct AudioHandle {
    context: Option<AudioContext>,
}

impl AudioHandle {
    /// Acquires a context from `factory`. A factory returning `None` means
    /// the platform has no audio; every cue then becomes a no-op.
    pub fn mount(factory: impl FnOnce() -> Option<AudioContext>) -> Self {
        let context = factory();
        if context.is_none() {
            debug!("no audio support; cues disabled");
        }
        Self { context }
    }

    /// A handle with no audio at all.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { context: None }
    }

    /// Whether a context exists and is already producing sound.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|ctx| ctx.state() == ContextState::Running)
    }

    /// Whether a context is held (not yet released).
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.context.is_some()
    }

    /// Resumes the context after a user gesture.
    pub fn resume(&mut self) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.resume();
        }
    }

    /// Emits a cue; no-op without a context.
    pub fn emit(&mut self, cue: AudioCue) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.emit(cue);
        }
    }

    /// Closes and drops the context. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(mut ctx) = self.context.take() {
            ctx.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Log {
        cues: Vec<AudioCue>,
        closes: usize,
    }

    struct Recording(Arc<Mutex<Log>>);

    impl AudioBackend for Recording {
        fn play(&mut self, cue: AudioCue, _tones: &ToneSequence) -> std::io::Result<()> {
            self.0.lock().unwrap().cues.push(cue);
            Ok(())
        }

        fn close(&mut self) -> std::io::Result<()> {
            self.0.lock().unwrap().closes += 1;
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn recording(autoplay: bool) -> (AudioContext, Arc<Mutex<Log>>) {
        let log = Arc::new(Mutex::new(Log::default()));
        let ctx = AudioContext::new(Box::new(Recording(Arc::clone(&log))), autoplay);
        (ctx, log)
    }

    #[test]
    fn test_suspended_context_is_silent_until_resumed() {
        let (mut ctx, log) = recording(false);
        assert_eq!(ctx.state(), ContextState::Suspended);
        ctx.emit(AudioCue::Click);
        assert!(log.lock().unwrap().cues.is_empty());

        ctx.resume();
        ctx.emit(AudioCue::Click);
        assert_eq!(log.lock().unwrap().cues, [AudioCue::Click]);
    }

    #[test]
    fn test_close_runs_once_even_with_drop() {
        let (mut ctx, log) = recording(true);
        ctx.close();
        ctx.close();
        drop(ctx);
        assert_eq!(log.lock().unwrap().closes, 1);
    }

    #[test]
    fn test_closed_context_ignores_resume_and_emit() {
        let (mut ctx, log) = recording(true);
        ctx.close();
        ctx.resume();
        ctx.emit(AudioCue::Success);
        assert_eq!(ctx.state(), ContextState::Closed);
        assert!(log.lock().unwrap().cues.is_empty());
    }

    #[test]
    fn test_handle_without_audio_is_noop() {
        let mut handle = AudioHandle::mount(|| None);
        assert!(!handle.is_mounted());
        assert!(!handle.is_running());
        handle.emit(AudioCue::Click);
        handle.emit(AudioCue::Success);
        handle.release();
    }

    #[test]
    fn test_handle_release_once() {
        let (ctx, log) = recording(true);
        let mut handle = AudioHandle::mount(|| Some(ctx));
        assert!(handle.is_running());
        handle.emit(AudioCue::Success);
        handle.release();
        handle.release();
        handle.emit(AudioCue::Success);
        let log = log.lock().unwrap();
        assert_eq!(log.cues, [AudioCue::Success]);
        assert_eq!(log.closes, 1);
    }
}
