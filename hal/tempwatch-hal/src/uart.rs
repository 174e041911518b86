//! UART serial communication abstractions
//!
//! The firmware only ever talks outward over serial, so this module
//! covers the transmit side: a blocking byte sink and its configuration.

/// UART transmitter
///
/// Blocking sink for the console text the firmware prints.
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been queued or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Block until everything queued has left the shift register
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write a string as raw ASCII bytes
    fn write_str_blocking(&mut self, text: &str) -> Result<(), Self::Error> {
        self.write_blocking(text.as_bytes())
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Baud-rate divisor split into integer and 1/64 fractional parts
    ///
    /// Assumes 16x oversampling: `BRD = clock / (16 * baud)`, with the
    /// fraction rounded to the nearest 64th. Returns `None` when the
    /// integer part falls outside `1..=0xFFFF`.
    pub fn divisors(&self, clock_hz: u32) -> Option<(u16, u8)> {
        if self.baudrate == 0 {
            return None;
        }

        let baud = self.baudrate as u64;
        // 64 * clock / (16 * baud), rounded
        let scaled = (clock_hz as u64 * 4 + baud / 2) / baud;
        let integer = scaled >> 6;
        let fraction = (scaled & 0x3F) as u8;

        if integer == 0 || integer > 0xFFFF {
            return None;
        }

        Some((integer as u16, fraction))
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
