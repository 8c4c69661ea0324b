//! Audio output backends.
//!
//! A backend receives each cue together with its synthesized tones and
//! decides what to do with them: ring the terminal bell, append PCM to a
//! WAV capture, or nothing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use super::AudioCue;
use super::tone::ToneSequence;

// ============================================================================
// Trait
// ============================================================================

/// Output device for synthesized cues.
pub trait AudioBackend: Send {
    /// Plays (or records) one cue.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the device rejects the output.
    fn play(&mut self, cue: AudioCue, tones: &ToneSequence) -> std::io::Result<()>;

    /// Releases the device. Called at most once by the owning context.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if flushing or finalizing fails.
    fn close(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

// ============================================================================
// Terminal bell
// ============================================================================

/// Rings the terminal bell (`BEL`, 0x07).
///
/// Keystroke clicks stay silent unless `ring_on_click` is set; a bell per
/// character is more noise than texture.
pub struct BellBackend<W: Write + Send> {
    writer: W,
    ring_on_click: bool,
}

impl BellBackend<std::io::Stderr> {
    /// Creates a bell backend on stderr.
    #[must_use]
    pub fn stderr(ring_on_click: bool) -> Self {
        Self::new(std::io::stderr(), ring_on_click)
    }
}

impl<W: Write + Send> BellBackend<W> {
    /// Creates a bell backend writing to `writer`.
    pub const fn new(writer: W, ring_on_click: bool) -> Self {
        Self {
            writer,
            ring_on_click,
        }
    }
}

impl<W: Write + Send> AudioBackend for BellBackend<W> {
    fn play(&mut self, cue: AudioCue, _tones: &ToneSequence) -> std::io::Result<()> {
        if cue == AudioCue::Click && !self.ring_on_click {
            return Ok(());
        }
        self.writer.write_all(b"\x07")?;
        self.writer.flush()
    }

    fn name(&self) -> &'static str {
        "bell"
    }
}

// ============================================================================
// WAV capture
// ============================================================================

/// Records cues into a 32-bit float mono WAV file on a wall-clock
/// timeline.
///
/// The first cue starts the timeline. Each later cue is placed at its
/// offset from the first, with silence filling the gap, so the typing
/// rhythm survives. A cue that arrives while the previous one is still
/// sounding is appended after it rather than mixed.
///
/// The file header is finalized on [`close`](AudioBackend::close); a capture
/// that is never closed is truncated but still readable by most tools.
pub struct WavBackend {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    sample_rate: u32,
    started: Option<Instant>,
    written: u64,
}

impl WavBackend {
    /// Creates the capture file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn create(path: &Path, sample_rate: u32) -> std::io::Result<Self> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let writer = hound::WavWriter::create(path, spec).map_err(hound_to_io)?;
        Ok(Self {
            writer: Some(writer),
            sample_rate,
            started: None,
            written: 0,
        })
    }

    /// Writes `tones` at `offset` into the timeline, padding with silence.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn write_at(&mut self, offset: Duration, tones: &ToneSequence) -> std::io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let due = (offset.as_secs_f64() * f64::from(self.sample_rate)).round() as u64;
        while self.written < due {
            writer.write_sample(0.0_f32).map_err(hound_to_io)?;
            self.written += 1;
        }
        for sample in tones.render(self.sample_rate) {
            writer.write_sample(sample).map_err(hound_to_io)?;
            self.written += 1;
        }
        Ok(())
    }
}

impl AudioBackend for WavBackend {
    fn play(&mut self, _cue: AudioCue, tones: &ToneSequence) -> std::io::Result<()> {
        let now = Instant::now();
        let started = *self.started.get_or_insert(now);
        self.write_at(now.duration_since(started), tones)
    }

    fn close(&mut self) -> std::io::Result<()> {
        match self.writer.take() {
            Some(writer) => writer.finalize().map_err(hound_to_io),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "wav"
    }
}

fn hound_to_io(err: hound::Error) -> std::io::Error {
    match err {
        hound::Error::IoError(e) => e,
        other => std::io::Error::other(other),
    }
}

// ============================================================================
// Silence
// ============================================================================

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn play(&mut self, _cue: AudioCue, _tones: &ToneSequence) -> std::io::Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "silent"
    }
}
