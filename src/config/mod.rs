//! Configuration module
//!
//! Loads and validates experience configuration files. Every field has a
//! default, so running without a file gives the stock experience.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult};
pub use schema::*;
pub use validation::validate;
