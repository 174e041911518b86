//! I2C bus abstractions
//!
//! Single-master I2C vocabulary shared by the bus driver, the sensor
//! protocol, and chip-specific register files. Bit positions follow the
//! master control/status register layout of the TM4C123 I2C module, which
//! is the layout every [`MasterRegisters`] implementation must present.

use bitflags::bitflags;

/// SCL low period in timer ticks (fixed by the I2C master timer)
pub const SCL_LOW_PERIOD: u32 = 6;

/// SCL high period in timer ticks
pub const SCL_HIGH_PERIOD: u32 = 4;

/// Largest value the 7-bit timer period register accepts
pub const MAX_TIMER_PERIOD: u32 = 0x7F;

/// I2C bus configuration
///
/// Fixed at initialization and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// System clock feeding the I2C module in Hz
    pub system_clock_hz: u32,
    /// SCL frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz) from the 16 MHz precision oscillator
    pub const STANDARD: Self = Self {
        system_clock_hz: 16_000_000,
        frequency: 100_000,
    };

    /// Fast mode (400 kHz) from the 16 MHz precision oscillator
    pub const FAST: Self = Self {
        system_clock_hz: 16_000_000,
        frequency: 400_000,
    };

    /// Create a configuration for an arbitrary clock tree
    pub const fn new(system_clock_hz: u32, frequency: u32) -> Self {
        Self {
            system_clock_hz,
            frequency,
        }
    }

    /// Timer period register value for this configuration
    ///
    /// `TPR = system_clock / (2 * (SCL_LP + SCL_HP) * SCL) - 1`
    ///
    /// 16 MHz at 100 kHz gives 7.
    pub fn timer_period(&self) -> Result<u8, I2cConfigError> {
        if self.frequency == 0 {
            return Err(I2cConfigError::ZeroFrequency);
        }

        let divisor = 2 * (SCL_LOW_PERIOD + SCL_HIGH_PERIOD) as u64 * self.frequency as u64;
        let ticks = self.system_clock_hz as u64 / divisor;

        // A period of zero is not a valid timer setting
        if ticks < 2 {
            return Err(I2cConfigError::FrequencyTooHigh);
        }

        let period = ticks - 1;
        if period > MAX_TIMER_PERIOD as u64 {
            return Err(I2cConfigError::FrequencyTooLow);
        }

        Ok(period as u8)
    }

    /// SCL frequency the programmed timer period actually produces
    pub fn actual_frequency(&self) -> Result<u32, I2cConfigError> {
        let period = self.timer_period()? as u32;
        Ok(self.system_clock_hz / (2 * (SCL_LOW_PERIOD + SCL_HIGH_PERIOD) * (period + 1)))
    }
}

/// Errors from an unusable bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cConfigError {
    /// SCL frequency of 0 Hz
    ZeroFrequency,
    /// SCL frequency cannot be reached from this system clock
    FrequencyTooHigh,
    /// Timer period would not fit in 7 bits
    FrequencyTooLow,
}

bitflags! {
    /// How the next byte transfer behaves on the bus
    ///
    /// Constructed fresh for every transfer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Conditions: u8 {
        /// Master enable: perform the transfer
        const RUN = 1 << 0;
        /// Generate a START (or repeated START) before the byte
        const START = 1 << 1;
        /// Generate a STOP after the byte
        const STOP = 1 << 2;
        /// Acknowledge the received byte
        const ACK = 1 << 3;
    }
}

bitflags! {
    /// Master status register snapshot
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Transfer in progress
        const BUSY = 1 << 0;
        /// Last operation failed
        const ERROR = 1 << 1;
        /// Address byte was not acknowledged
        const ADDRESS_NACK = 1 << 2;
        /// Data byte was not acknowledged
        const DATA_NACK = 1 << 3;
        /// Arbitration lost
        const ARBITRATION_LOST = 1 << 4;
        /// Master is idle
        const IDLE = 1 << 5;
        /// Bus is held by some master
        const BUS_BUSY = 1 << 6;
        /// SCL held low past the clock timeout
        const CLOCK_TIMEOUT = 1 << 7;
    }
}

impl Status {
    /// Flags reported back to the caller on failure
    pub const FAULTS: Self = Self::ERROR
        .union(Self::ADDRESS_NACK)
        .union(Self::DATA_NACK)
        .union(Self::ARBITRATION_LOST)
        .union(Self::CLOCK_TIMEOUT);

    /// The transfer engine is still working
    pub fn is_busy(self) -> bool {
        self.contains(Self::BUSY)
    }

    /// The last transfer failed
    pub fn has_error(self) -> bool {
        self.intersects(Self::ERROR | Self::ARBITRATION_LOST | Self::CLOCK_TIMEOUT)
    }

    /// Only the fault flags of this snapshot
    pub fn faults(self) -> Self {
        self & Self::FAULTS
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Conditions {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Conditions({=u8:#x})", self.bits())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status({=u8:#x})", self.bits())
    }
}

/// Transfer direction encoded in bit 0 of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master transmits
    #[default]
    Write,
    /// Master receives
    Read,
}

impl Direction {
    /// R/S bit value
    pub const fn bit(self) -> u8 {
        match self {
            Direction::Write => 0,
            Direction::Read => 1,
        }
    }
}

/// 7-bit I2C target address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveAddress(u8);

impl SlaveAddress {
    /// Create an address, rejecting anything wider than 7 bits
    pub const fn new(address: u8) -> Option<Self> {
        if address <= 0x7F {
            Some(Self(address))
        } else {
            None
        }
    }

    /// Raw 7-bit value
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Address byte as it appears on the wire
    pub const fn address_byte(self, direction: Direction) -> u8 {
        (self.0 << 1) | direction.bit()
    }
}

/// Error from a byte-level bus operation
///
/// Every variant that came from the hardware keeps the exact fault flags
/// that were set when the transfer finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Target did not acknowledge its address
    AddressNack(Status),
    /// Target did not acknowledge a data byte
    DataNack(Status),
    /// Arbitration lost or an unclassified bus error
    Other(Status),
    /// Gave up waiting for the transfer engine
    Timeout,
}

impl BusError {
    /// Classify a finished transfer, `None` if it succeeded
    pub fn from_status(status: Status) -> Option<Self> {
        if !status.has_error() {
            return None;
        }

        let faults = status.faults();
        let error = if faults.contains(Status::ADDRESS_NACK) {
            BusError::AddressNack(faults)
        } else if faults.contains(Status::DATA_NACK) {
            BusError::DataNack(faults)
        } else {
            BusError::Other(faults)
        };
        Some(error)
    }

    /// Raw fault flags (empty for a timeout)
    pub fn flags(&self) -> Status {
        match *self {
            BusError::AddressNack(flags) | BusError::DataNack(flags) | BusError::Other(flags) => {
                flags
            }
            BusError::Timeout => Status::empty(),
        }
    }

    /// Short human-readable reason
    pub fn as_str(&self) -> &'static str {
        match self {
            BusError::AddressNack(_) => "address nack",
            BusError::DataNack(_) => "data nack",
            BusError::Other(flags) if flags.contains(Status::ARBITRATION_LOST) => {
                "arbitration lost"
            }
            BusError::Other(flags) if flags.contains(Status::CLOCK_TIMEOUT) => "clock timeout",
            BusError::Other(_) => "bus error",
            BusError::Timeout => "bus timeout",
        }
    }
}

/// Raw I2C master register file
///
/// Implemented by chip HALs over memory-mapped registers and by test
/// doubles over plain memory. The driver never assumes a singleton: it is
/// handed one of these and owns it.
pub trait MasterRegisters {
    /// Enable the module in master mode
    fn enable_master(&mut self);

    /// Program the SCL timer period
    fn set_timer_period(&mut self, period: u8);

    /// Current slave address register (address in bits 7..1, direction in bit 0)
    fn address(&self) -> u8;

    /// Overwrite the slave address register
    fn set_address(&mut self, value: u8);

    /// Load the byte to transmit
    fn write_data(&mut self, byte: u8);

    /// Fetch the last received byte
    fn read_data(&mut self) -> u8;

    /// Write the control register, starting whatever the conditions ask for
    fn write_control(&mut self, conditions: Conditions);

    /// Read the status register
    fn status(&mut self) -> Status;
}

/// How the driver waits for the transfer engine to finish
///
/// This is the only blocking point in the bus stack. Tests substitute
/// strategies that never sleep; hardware uses [`Polling`].
pub trait PollStrategy {
    /// Spin until `busy` returns false
    ///
    /// Returns `false` if the strategy gave up while still busy.
    fn wait_ready<F: FnMut() -> bool>(&mut self, busy: F) -> bool;
}

/// Busy-poll strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polling {
    /// Poll forever; a wedged target hangs the caller
    #[default]
    Unbounded,
    /// Allow this many busy polls, give up on the next one
    Bounded {
        /// Busy polls allowed before reporting a timeout
        max_polls: u32,
    },
}

impl PollStrategy for Polling {
    fn wait_ready<F: FnMut() -> bool>(&mut self, mut busy: F) -> bool {
        match *self {
            Polling::Unbounded => {
                while busy() {
                    core::hint::spin_loop();
                }
                true
            }
            Polling::Bounded { max_polls } => {
                let mut polls = 0u32;
                while busy() {
                    polls += 1;
                    if polls > max_polls {
                        return false;
                    }
                    core::hint::spin_loop();
                }
                true
            }
        }
    }
}

/// Byte-level I2C master
///
/// Exactly one logical flow of control may drive a bus at a time. The
/// `&mut self` receivers enforce this within one context; callers sharing
/// a bus across contexts must hold a lock around each complete register
/// transaction, not around individual bytes.
pub trait I2cBus {
    /// Select whether the next addressed phase writes or reads
    fn set_direction(&mut self, direction: Direction);

    /// Select the target device
    fn set_slave_address(&mut self, address: SlaveAddress);

    /// Transmit one byte under the given conditions
    ///
    /// On error the bus has already been released with a STOP.
    fn send_byte(&mut self, data: u8, conditions: Conditions) -> Result<(), BusError>;

    /// Receive one byte under the given conditions
    ///
    /// On error the bus has already been released with a STOP and no
    /// data is returned.
    fn receive_byte(&mut self, conditions: Conditions) -> Result<u8, BusError>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    fn set_direction(&mut self, direction: Direction) {
        (**self).set_direction(direction)
    }

    fn set_slave_address(&mut self, address: SlaveAddress) {
        (**self).set_slave_address(address)
    }

    fn send_byte(&mut self, data: u8, conditions: Conditions) -> Result<(), BusError> {
        (**self).send_byte(data, conditions)
    }

    fn receive_byte(&mut self, conditions: Conditions) -> Result<u8, BusError> {
        (**self).receive_byte(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_timer_period() {
        assert_eq!(I2cConfig::STANDARD.timer_period(), Ok(7));
        assert_eq!(I2cConfig::STANDARD.actual_frequency(), Ok(100_000));
        assert_eq!(I2cConfig::default(), I2cConfig::STANDARD);
    }

    #[test]
    fn test_fast_timer_period() {
        assert_eq!(I2cConfig::FAST.timer_period(), Ok(1));
        // 80 MHz PLL clock at 100 kHz
        assert_eq!(I2cConfig::new(80_000_000, 100_000).timer_period(), Ok(39));
    }

    #[test]
    fn test_timer_period_out_of_range() {
        assert_eq!(
            I2cConfig::new(16_000_000, 0).timer_period(),
            Err(I2cConfigError::ZeroFrequency)
        );
        assert_eq!(
            I2cConfig::new(16_000_000, 1_000_000).timer_period(),
            Err(I2cConfigError::FrequencyTooHigh)
        );
        assert_eq!(
            I2cConfig::new(80_000_000, 10_000).timer_period(),
            Err(I2cConfigError::FrequencyTooLow)
        );
    }

    #[test]
    fn test_address_byte() {
        let addr = SlaveAddress::new(0x18).unwrap();
        assert_eq!(addr.address_byte(Direction::Write), 0x30);
        assert_eq!(addr.address_byte(Direction::Read), 0x31);
        assert_eq!(SlaveAddress::new(0x7F).map(SlaveAddress::get), Some(0x7F));
        assert!(SlaveAddress::new(0x80).is_none());
    }

    #[test]
    fn test_status_error_detection() {
        assert!(!Status::IDLE.has_error());
        assert!(Status::ERROR.has_error());
        assert!(Status::ARBITRATION_LOST.has_error());
        // Ack flags alone don't signal a failure
        assert!(!Status::DATA_NACK.has_error());
        assert_eq!(
            (Status::ERROR | Status::IDLE | Status::DATA_NACK).faults(),
            Status::ERROR | Status::DATA_NACK
        );
    }

    #[test]
    fn test_bus_error_classification() {
        assert_eq!(BusError::from_status(Status::IDLE), None);

        let err = BusError::from_status(Status::ERROR | Status::ADDRESS_NACK | Status::IDLE);
        assert_eq!(
            err,
            Some(BusError::AddressNack(Status::ERROR | Status::ADDRESS_NACK))
        );

        let err = BusError::from_status(Status::ERROR | Status::DATA_NACK).unwrap();
        assert_eq!(err.flags(), Status::ERROR | Status::DATA_NACK);
        assert_eq!(err.as_str(), "data nack");

        let err = BusError::from_status(Status::ARBITRATION_LOST).unwrap();
        assert_eq!(err, BusError::Other(Status::ARBITRATION_LOST));
        assert_eq!(err.as_str(), "arbitration lost");

        assert_eq!(BusError::Timeout.flags(), Status::empty());
    }

    #[test]
    fn test_clock_timeout_is_kept() {
        assert!(Status::CLOCK_TIMEOUT.has_error());

        let flags = Status::ERROR | Status::CLOCK_TIMEOUT;
        let err = BusError::from_status(flags | Status::IDLE).unwrap();
        assert_eq!(err, BusError::Other(flags));
        assert_eq!(err.flags(), flags);
        assert_eq!(err.as_str(), "clock timeout");
    }

    #[test]
    fn test_bounded_polling_uses_whole_budget() {
        let mut busy_for = 1;
        let ready = Polling::Bounded { max_polls: 1 }.wait_ready(|| {
            if busy_for == 0 {
                false
            } else {
                busy_for -= 1;
                true
            }
        });
        assert!(ready);

        let mut busy_for = 2;
        let ready = Polling::Bounded { max_polls: 1 }.wait_ready(|| {
            if busy_for == 0 {
                false
            } else {
                busy_for -= 1;
                true
            }
        });
        assert!(!ready);
    }

    #[test]
    fn test_unbounded_polling_waits() {
        let mut remaining = 5;
        let ready = Polling::Unbounded.wait_ready(|| {
            if remaining == 0 {
                false
            } else {
                remaining -= 1;
                true
            }
        });
        assert!(ready);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_bounded_polling_gives_up() {
        let mut polls = 0;
        let mut strategy = Polling::Bounded { max_polls: 10 };
        let ready = strategy.wait_ready(|| {
            polls += 1;
            true
        });
        assert!(!ready);
        // Ten busy polls allowed, the eleventh gives up
        assert_eq!(polls, 11);

        // Not busy at all succeeds regardless of the budget
        assert!(Polling::Bounded { max_polls: 0 }.wait_ready(|| false));
    }
}
