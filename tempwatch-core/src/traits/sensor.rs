//! Temperature sensor traits

use tempwatch_hal::BusError;

use crate::temperature::Temperature;

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The bus transaction failed (bus already released)
    Bus(BusError),
    /// Something answered at the address, but it is not the expected part
    UnexpectedDevice {
        /// Manufacturer ID register contents
        manufacturer: u16,
        /// Device ID (upper byte of the device ID register)
        device: u8,
    },
}

impl From<BusError> for SensorError {
    fn from(e: BusError) -> Self {
        SensorError::Bus(e)
    }
}

impl SensorError {
    /// Short human-readable reason
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorError::Bus(e) => e.as_str(),
            SensorError::UnexpectedDevice { .. } => "unexpected device",
        }
    }
}

/// Trait for temperature sensors
///
/// Takes `&mut self` throughout because every reading is a bus transaction.
pub trait TemperatureSensor {
    /// Read the current temperature at full sensor resolution
    fn read_temperature(&mut self) -> Result<Temperature, SensorError>;

    /// Read the current temperature in degrees Celsius
    ///
    /// Returns a fixed-point value with 0.1°C resolution.
    /// For example, 45.5°C is returned as 455.
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        self.read_temperature().map(Temperature::celsius_x10)
    }

    /// Read the current temperature in whole degrees Celsius
    fn read_celsius(&mut self) -> Result<i16, SensorError> {
        self.read_celsius_x10().map(|t| t / 10)
    }

    /// Read the current temperature in whole degrees Fahrenheit
    fn read_fahrenheit(&mut self) -> Result<i32, SensorError> {
        self.read_temperature().map(Temperature::fahrenheit)
    }

    /// Check if the sensor reading is valid
    fn is_valid(&mut self) -> bool {
        self.read_temperature().is_ok()
    }
}
