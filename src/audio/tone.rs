//! Tone synthesis for audio cues.
//!
//! A cue is a short [`ToneSequence`]: one or more oscillator notes with a
//! start offset, a stop time and a gain envelope. Sequences render to mono
//! `f32` PCM so backends can play, capture or ignore them.

use std::f32::consts::TAU;
use std::time::Duration;

use rand::Rng;

/// Lowest sample rate that still resolves the highest chime note.
pub const MIN_SAMPLE_RATE: u32 = 8_000;

/// Oscillator shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// Hard-edged square wave (keystroke clicks).
    Square,
    /// Pure sine (chime).
    Sine,
}

/// Gain envelope applied to a note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope {
    /// Constant gain for the whole note.
    Flat(f32),
    /// Exponential ramp from `from` to `to`, reaching `to` after `ramp`.
    Exponential {
        /// Starting gain.
        from: f32,
        /// Gain reached at the end of the ramp.
        to: f32,
        /// Ramp length.
        ramp: Duration,
    },
}

impl Envelope {
    /// Gain `t` after the note started.
    #[must_use]
    pub fn gain_at(&self, t: Duration) -> f32 {
        match *self {
            Self::Flat(gain) => gain,
            Self::Exponential { from, to, ramp } => {
                if ramp.is_zero() || t >= ramp {
                    return to;
                }
                let progress = t.as_secs_f32() / ramp.as_secs_f32();
                from * (to / from).powf(progress)
            }
        }
    }
}

/// One oscillator note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Oscillator shape.
    pub waveform: Waveform,
    /// Frequency in hertz.
    pub frequency_hz: f32,
    /// Offset from the start of the sequence.
    pub start: Duration,
    /// How long the oscillator runs.
    pub length: Duration,
    /// Gain over the note's lifetime.
    pub envelope: Envelope,
}

impl Tone {
    /// Oscillator output (before gain) at `t` seconds into the note.
    fn sample(&self, t: f32) -> f32 {
        let phase = (self.frequency_hz * t).fract();
        match self.waveform {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// A cue's notes, played together.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSequence {
    tones: Vec<Tone>,
}

impl ToneSequence {
    /// Keystroke click: a 50 ms square blip between 420 and 560 Hz.
    ///
    /// The pitch jitters per keystroke so a run of clicks does not drone.
    pub fn click<R: Rng>(rng: &mut R) -> Self {
        let jitter: f32 = rng.random_range(0.0..140.0);
        Self {
            tones: vec![Tone {
                waveform: Waveform::Square,
                frequency_hz: 420.0 + jitter,
                start: Duration::ZERO,
                length: Duration::from_millis(50),
                envelope: Envelope::Flat(0.14),
            }],
        }
    }

    /// Success chime: three rising sine notes, 80 ms apart, each decaying
    /// over half a second.
    #[must_use]
    pub fn success() -> Self {
        let tones = [0_u16, 1, 2]
            .into_iter()
            .map(|idx| Tone {
                waveform: Waveform::Sine,
                frequency_hz: 90.0f32.mul_add(f32::from(idx), 480.0),
                start: Duration::from_millis(80 * u64::from(idx)),
                length: Duration::from_millis(550),
                envelope: Envelope::Exponential {
                    from: 0.18,
                    to: 0.001,
                    ramp: Duration::from_millis(500),
                },
            })
            .collect();
        Self { tones }
    }

    /// The notes of this sequence.
    #[must_use]
    pub fn tones(&self) -> &[Tone] {
        &self.tones
    }

    /// Time from the sequence start until the last note stops.
    #[must_use]
    pub fn total_length(&self) -> Duration {
        self.tones
            .iter()
            .map(|tone| tone.start + tone.length)
            .max()
            .unwrap_or_default()
    }

    /// Renders the sequence to mono PCM at `sample_rate`, mixing overlapping
    /// notes and clamping to `[-1, 1]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = f64::from(sample_rate);
        let mut buffer = vec![0.0_f32; frames(self.total_length(), sample_rate)];

        for tone in &self.tones {
            let first = frames(tone.start, sample_rate);
            let count = frames(tone.length, sample_rate);
            for (offset, slot) in buffer.iter_mut().skip(first).take(count).enumerate() {
                let t = offset as f64 / rate;
                let gain = tone.envelope.gain_at(Duration::from_secs_f64(t));
                *slot += tone.sample(t as f32) * gain;
            }
        }

        for sample in &mut buffer {
            *sample = sample.clamp(-1.0, 1.0);
        }
        buffer
    }
}

/// Number of frames covering `span` at `sample_rate`, rounded to nearest.
fn frames(span: Duration, sample_rate: u32) -> usize {
    let scaled = span.as_nanos() * u128::from(sample_rate) + 500_000_000;
    usize::try_from(scaled / 1_000_000_000).unwrap_or(usize::MAX)
}
