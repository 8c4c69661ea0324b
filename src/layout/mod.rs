//! Photo montage layout.
//!
//! - [`SeededRandom`]: repeatable random stream from a string key
//! - [`RainLayoutBuilder`]: scatters photos into falling [`RainItem`] sprites

pub mod rain;
pub mod seeded;

pub use rain::{RainItem, RainLayoutBuilder};
pub use seeded::{SeededRandom, hash_seed};
