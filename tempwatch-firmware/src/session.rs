//! Boot-time sensor setup
//!
//! Each step is independent: a failure is logged and the next step still
//! runs. The reading loop starts regardless, so a sensor that comes up
//! late is picked up on a later iteration.

use defmt::*;
use tempwatch_core::config::SensorConfig;
use tempwatch_core::temperature::Temperature;
use tempwatch_drivers::sensor::mcp9808::Mcp9808Config;
use tempwatch_drivers::sensor::Mcp9808;
use tempwatch_hal::{BusError, I2cBus};

type LimitSetter<B> = fn(&mut Mcp9808<B>, Temperature) -> Result<(), BusError>;

/// Apply the configured identity check, configuration and limits
pub fn prepare<B: I2cBus>(sensor: &mut Mcp9808<B>, config: &SensorConfig) {
    if config.verify_identity {
        match sensor.verify_identity() {
            Ok(()) => info!("MCP9808 found at {=u8:#x}", config.address),
            Err(e) => warn!("MCP9808 identity check failed: {}", e),
        }
    }

    if let Some(raw) = config.config_register {
        let bits = Mcp9808Config::from_bits_retain(raw);
        match sensor.configure(bits) {
            Ok(()) => debug!("MCP9808 CONFIG = {=u16:#x}", raw),
            Err(e) => warn!("Failed to write CONFIG: {}", e),
        }
    }

    let limits: [(&str, Option<Temperature>, LimitSetter<B>); 3] = [
        ("lower", config.lower_limit(), Mcp9808::set_lower_limit),
        ("upper", config.upper_limit(), Mcp9808::set_upper_limit),
        ("critical", config.critical_limit(), Mcp9808::set_critical_limit),
    ];

    for (name, limit, set) in limits {
        let Some(limit) = limit else { continue };
        match set(sensor, limit) {
            Ok(()) => debug!("{} limit = {} C/10", name, limit.celsius_x10()),
            Err(e) => warn!("Failed to set {} limit: {}", name, e),
        }
    }
}
