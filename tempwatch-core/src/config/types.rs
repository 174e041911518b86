//! Configuration type definitions
//!
//! These types describe the board clocking, the sensor session, and the
//! polling loop. All fields are public and plain so that a configuration
//! can be written out as a `const` by the firmware build script.

use tempwatch_hal::i2c::{I2cConfig, I2cConfigError};
use tempwatch_hal::{Polling, SlaveAddress, UartConfig};

use crate::temperature::Temperature;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default MCP9808 address (A2..A0 tied low)
pub const DEFAULT_SENSOR_ADDRESS: u8 = 0x18;

/// Default time between readings
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 1000;

/// Board clocking and serial settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoardConfig {
    /// System clock in Hz
    pub system_clock_hz: u32,
    /// I2C SCL frequency in Hz
    pub i2c_frequency_hz: u32,
    /// Console baud rate
    pub uart_baudrate: u32,
    /// Busy polls allowed per byte transfer (0 = wait forever)
    pub poll_limit: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            system_clock_hz: 16_000_000,
            i2c_frequency_hz: 100_000,
            uart_baudrate: 115_200,
            poll_limit: 0,
        }
    }
}

impl BoardConfig {
    /// I2C bus configuration
    pub fn i2c(&self) -> I2cConfig {
        I2cConfig::new(self.system_clock_hz, self.i2c_frequency_hz)
    }

    /// Console UART configuration (8N1)
    pub fn uart(&self) -> UartConfig {
        UartConfig {
            baudrate: self.uart_baudrate,
            ..UartConfig::default()
        }
    }

    /// Polling strategy for the bus driver
    pub fn polling(&self) -> Polling {
        match self.poll_limit {
            0 => Polling::Unbounded,
            max_polls => Polling::Bounded { max_polls },
        }
    }
}

/// Sensor session settings
///
/// Limits are in tenths of a degree Celsius; `None` leaves the sensor's
/// power-on value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SensorConfig {
    /// 7-bit I2C address
    pub address: u8,
    /// Check manufacturer and device IDs at boot
    pub verify_identity: bool,
    /// Raw configuration register value to write at boot
    pub config_register: Option<u16>,
    /// Upper alert limit (°C x10)
    pub upper_limit_x10: Option<i16>,
    /// Lower alert limit (°C x10)
    pub lower_limit_x10: Option<i16>,
    /// Critical alert limit (°C x10)
    pub critical_limit_x10: Option<i16>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SENSOR_ADDRESS,
            verify_identity: true,
            config_register: None,
            upper_limit_x10: None,
            lower_limit_x10: None,
            critical_limit_x10: None,
        }
    }
}

impl SensorConfig {
    /// Validated slave address
    pub fn slave_address(&self) -> Option<SlaveAddress> {
        SlaveAddress::new(self.address)
    }

    /// Upper limit as a sensor temperature
    pub fn upper_limit(&self) -> Option<Temperature> {
        self.upper_limit_x10.and_then(Temperature::from_celsius_x10)
    }

    /// Lower limit as a sensor temperature
    pub fn lower_limit(&self) -> Option<Temperature> {
        self.lower_limit_x10.and_then(Temperature::from_celsius_x10)
    }

    /// Critical limit as a sensor temperature
    pub fn critical_limit(&self) -> Option<Temperature> {
        self.critical_limit_x10.and_then(Temperature::from_celsius_x10)
    }
}

/// Complete firmware configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TempwatchConfig {
    /// Board clocking
    pub board: BoardConfig,
    /// Sensor session
    pub sensor: SensorConfig,
    /// Time between readings in milliseconds
    pub poll_interval_ms: u32,
}

impl Default for TempwatchConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            sensor: SensorConfig::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// I2C timing cannot be produced from the system clock
    I2cTiming(I2cConfigError),
    /// Baud rate cannot be produced from the system clock
    UartBaudrate,
    /// Address does not fit in 7 bits
    InvalidAddress,
    /// A limit is outside the sensor's range
    LimitOutOfRange,
    /// Limits are not ordered lower <= upper <= critical
    LimitOrder,
    /// Poll interval of zero
    ZeroPollInterval,
}

impl From<I2cConfigError> for ConfigError {
    fn from(e: I2cConfigError) -> Self {
        ConfigError::I2cTiming(e)
    }
}

impl TempwatchConfig {
    /// Check that every setting can actually be applied
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.i2c().timer_period()?;

        if self
            .board
            .uart()
            .divisors(self.board.system_clock_hz)
            .is_none()
        {
            return Err(ConfigError::UartBaudrate);
        }

        if self.sensor.slave_address().is_none() {
            return Err(ConfigError::InvalidAddress);
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        let limits = [
            (self.sensor.lower_limit_x10, self.sensor.lower_limit()),
            (self.sensor.upper_limit_x10, self.sensor.upper_limit()),
            (self.sensor.critical_limit_x10, self.sensor.critical_limit()),
        ];
        if limits
            .iter()
            .any(|(raw, parsed)| raw.is_some() && parsed.is_none())
        {
            return Err(ConfigError::LimitOutOfRange);
        }

        // Only the limits that are set need to be ordered
        let mut previous: Option<i16> = None;
        for current in limits.iter().filter_map(|(raw, _)| *raw) {
            if previous.is_some_and(|p| p > current) {
                return Err(ConfigError::LimitOrder);
            }
            previous = Some(current);
        }

        Ok(())
    }
}
