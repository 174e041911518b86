//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware builds a
//! [`TempwatchConfig`] at compile time from `sensor.toml`.

pub mod types;

pub use types::*;
