//! Board-agnostic core logic for the temperature probe firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Ambient-temperature register decoding and encoding
//! - Temperature sensor trait and errors
//! - Configuration type definitions and validation
//! - Console report formatting

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod report;
pub mod temperature;
pub mod traits;
