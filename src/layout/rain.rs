//! Photo rain layout.
//!
//! Turns an ordered list of image sources into a bounded list of falling
//! sprite descriptors. Every sprite draws its parameters from a
//! [`SeededRandom`] keyed by `"{src}-{index}"`, so the layout is a pure
//! function of the photo list.

use serde::Serialize;

use super::seeded::SeededRandom;

/// Smallest sprite edge in pixels.
pub const MIN_SIZE: f64 = 180.0;

/// Range added on top of [`MIN_SIZE`].
pub const SIZE_SPREAD: f64 = 200.0;

/// Opacity floor; sprites are never fainter than this.
pub const MIN_OPACITY: f64 = 0.8;

/// Blur radius applied to "soft focus" sprites.
pub const SOFT_BLUR: f64 = 0.6;

/// Draws above this threshold produce a soft-focus sprite.
const BLUR_THRESHOLD: f64 = 0.92;

/// One falling photo sprite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainItem {
    /// Stable identifier, `"{src}-{index}"`.
    pub id: String,
    /// Image source reference.
    pub src: String,
    /// Horizontal position as a percentage of the viewport width.
    pub x: f64,
    /// Edge length in pixels.
    pub size: f64,
    /// Duration of one fall cycle, in seconds.
    pub duration: f64,
    /// Negative start offset so the sprite is already mid-fall on mount.
    pub delay: f64,
    /// Opacity in `[0.8, 1.0)`.
    pub opacity: f64,
    /// Blur radius, either `0.0` or [`SOFT_BLUR`].
    pub blur: f64,
    /// First sway extreme, in degrees.
    pub tilt: f64,
    /// Second sway extreme, in degrees.
    pub tilt_alt: f64,
}

impl RainItem {
    /// Fraction of the fall cycle completed at `elapsed` seconds after mount.
    ///
    /// The negative delay shifts the cycle so that `progress(0.0)` is
    /// already somewhere inside `[0, 1)`.
    #[must_use]
    pub fn progress(&self, elapsed: f64) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        ((elapsed - self.delay) / self.duration).rem_euclid(1.0)
    }

    /// Current tilt at `elapsed` seconds, swaying between the two extremes
    /// twice per fall cycle.
    #[must_use]
    pub fn tilt_at(&self, elapsed: f64) -> f64 {
        let phase = (self.progress(elapsed) * 2.0).fract();
        // Triangle wave: tilt -> tilt_alt -> tilt.
        let weight = if phase < 0.5 { phase * 2.0 } else { (1.0 - phase) * 2.0 };
        (self.tilt_alt - self.tilt).mul_add(weight, self.tilt)
    }
}

/// Builder for the photo rain.
///
/// Defaults give `clamp(3 × photos, 12, 28)` sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainLayoutBuilder {
    per_photo: usize,
    min_items: usize,
    max_items: usize,
}

impl Default for RainLayoutBuilder {
    fn default() -> Self {
        Self {
            per_photo: 3,
            min_items: 12,
            max_items: 28,
        }
    }
}

impl RainLayoutBuilder {
    /// Creates a builder with the default density.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many sprites each photo contributes before clamping.
    #[must_use]
    pub const fn per_photo(mut self, per_photo: usize) -> Self {
        self.per_photo = per_photo;
        self
    }

    /// Sets the inclusive sprite count bounds.
    ///
    /// If `min > max` the bounds are swapped rather than panicking.
    #[must_use]
    pub const fn bounds(mut self, min: usize, max: usize) -> Self {
        if min <= max {
            self.min_items = min;
            self.max_items = max;
        } else {
            self.min_items = max;
            self.max_items = min;
        }
        self
    }

    /// Number of sprites produced for `photo_count` photos.
    #[must_use]
    pub fn item_count(&self, photo_count: usize) -> usize {
        if photo_count == 0 {
            return 0;
        }
        photo_count
            .saturating_mul(self.per_photo)
            .clamp(self.min_items, self.max_items)
    }

    /// Builds the sprite list. An empty photo list yields no sprites.
    #[must_use]
    pub fn build<S: AsRef<str>>(&self, photos: &[S]) -> Vec<RainItem> {
        let total = self.item_count(photos.len());
        (0..total)
            .map(|index| {
                let src = photos[index % photos.len()].as_ref();
                rain_item(src, index)
            })
            .collect()
    }
}

/// Draws one sprite. The draw order is fixed; changing it changes every
/// layout.
#[allow(clippy::suboptimal_flops)]
fn rain_item(src: &str, index: usize) -> RainItem {
    let id = format!("{src}-{index}");
    let mut rng = SeededRandom::from_key(&id);

    let size = MIN_SIZE + rng.next_f64() * SIZE_SPREAD;
    let duration = 9.0 + rng.next_f64() * 9.0;
    let delay = -rng.next_f64() * duration;
    let tilt = -8.0 + rng.next_f64() * 16.0;
    let direction = if rng.next_f64() > 0.5 { 1.0 } else { -1.0 };
    let tilt_alt = tilt + direction * (6.0 + rng.next_f64() * 6.0);
    let x = rng.next_f64() * 100.0;
    let opacity = MIN_OPACITY + rng.next_f64() * 0.2;
    let blur = if rng.next_f64() > BLUR_THRESHOLD {
        SOFT_BLUR
    } else {
        0.0
    };

    RainItem {
        id,
        src: src.to_string(),
        x,
        size,
        duration,
        delay,
        opacity,
        blur,
        tilt,
        tilt_alt,
    }
}
