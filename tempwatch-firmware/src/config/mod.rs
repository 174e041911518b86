//! Firmware configuration
//!
//! `sensor.toml` is parsed and validated by the build script, which
//! writes it out as the [`CONFIG`] const included here.

use defmt::*;
use tempwatch_core::config::{BoardConfig, SensorConfig, TempwatchConfig};

include!(concat!(env!("OUT_DIR"), "/config.rs"));

/// Configuration to run with
///
/// Validated again at boot; falls back to the defaults for the
/// EK-TM4C123GXL if the compiled-in settings are rejected.
pub fn load() -> TempwatchConfig {
    match CONFIG.validate() {
        Ok(()) => CONFIG,
        Err(e) => {
            error!("Compiled-in configuration rejected: {}, using defaults", e);
            TempwatchConfig::default()
        }
    }
}
