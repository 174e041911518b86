//! MCP9808 digital temperature sensor
//!
//! The MCP9808 exposes 16-bit registers behind a one-byte register
//! pointer. Every register is transferred MSB first.
//!
//! # Register Read
//!
//! ```text
//! S  addr+W  A  reg  A  Sr  addr+R  A  msb  A  lsb  N  P
//! └─ START ───────────┘ └─ repeated START ──┘ ACK  NACK+STOP
//! ```
//!
//! # Register Write
//!
//! ```text
//! S  addr+W  A  reg  A  msb  A  lsb  A  P
//! ```
//!
//! The first bus error aborts the remaining steps. The bus driver has
//! already issued STOP by the time the error reaches this layer, so no
//! partially read value is ever returned.

use bitflags::bitflags;
use tempwatch_core::temperature::{AmbientReading, Temperature};
use tempwatch_core::traits::{SensorError, TemperatureSensor};
use tempwatch_hal::{BusError, Conditions, Direction, I2cBus, SlaveAddress};

/// MCP9808 register pointers
pub mod reg {
    /// Sensor configuration
    pub const CONFIG: u8 = 0x01;
    /// Alert upper boundary
    pub const UPPER_LIMIT: u8 = 0x02;
    /// Alert lower boundary
    pub const LOWER_LIMIT: u8 = 0x03;
    /// Critical temperature
    pub const CRITICAL_LIMIT: u8 = 0x04;
    /// Ambient temperature and alert flags
    pub const AMBIENT: u8 = 0x05;
    /// Manufacturer ID
    pub const MANUFACTURER_ID: u8 = 0x06;
    /// Device ID (upper byte) and revision (lower byte)
    pub const DEVICE_ID: u8 = 0x07;
}

/// Address with A2..A0 tied low
pub const DEFAULT_ADDRESS: u8 = 0x18;

/// Expected manufacturer ID register contents
pub const MANUFACTURER_ID: u16 = 0x0054;

/// Expected device ID
pub const DEVICE_ID: u8 = 0x04;

/// Write the register pointer, opening the transaction
const POINTER_WRITE: Conditions = Conditions::RUN.union(Conditions::START);
/// Repeated START, read MSB and acknowledge it
const FIRST_READ: Conditions = Conditions::RUN
    .union(Conditions::START)
    .union(Conditions::ACK);
/// Read LSB without acknowledging, then STOP
const LAST_READ: Conditions = Conditions::RUN.union(Conditions::STOP);
/// Data byte in the middle of a write
const DATA_WRITE: Conditions = Conditions::RUN;
/// Final data byte, then STOP
const LAST_WRITE: Conditions = Conditions::RUN.union(Conditions::STOP);

bitflags! {
    /// Configuration register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mcp9808Config: u16 {
        /// Alert output in interrupt mode (comparator mode when clear)
        const ALERT_INTERRUPT = 1 << 0;
        /// Alert output active-high (active-low when clear)
        const ALERT_ACTIVE_HIGH = 1 << 1;
        /// Alert only on the critical limit
        const ALERT_CRITICAL_ONLY = 1 << 2;
        /// Alert output enabled
        const ALERT_ENABLE = 1 << 3;
        /// Alert output currently asserted (read-only)
        const ALERT_STATUS = 1 << 4;
        /// Clear a latched interrupt
        const INTERRUPT_CLEAR = 1 << 5;
        /// Lock the upper and lower limits until reset
        const WINDOW_LOCK = 1 << 6;
        /// Lock the critical limit until reset
        const CRITICAL_LOCK = 1 << 7;
        /// Low-power shutdown
        const SHUTDOWN = 1 << 8;
        /// Hysteresis field, low bit
        const HYSTERESIS_0 = 1 << 9;
        /// Hysteresis field, high bit
        const HYSTERESIS_1 = 1 << 10;
    }
}

impl Mcp9808Config {
    /// Interrupt-mode, active-low alert on all three limits
    pub const INTERRUPT_ALERTS: Self = Self::ALERT_INTERRUPT.union(Self::ALERT_ENABLE);

    /// Replace the hysteresis field
    pub fn with_hysteresis(self, hysteresis: Hysteresis) -> Self {
        let cleared = self.difference(Self::HYSTERESIS_0 | Self::HYSTERESIS_1);
        cleared | Self::from_bits_retain((hysteresis as u16) << 9)
    }

    /// Current hysteresis setting
    pub fn hysteresis(self) -> Hysteresis {
        match (self.bits() >> 9) & 0b11 {
            0 => Hysteresis::Zero,
            1 => Hysteresis::Half,
            2 => Hysteresis::OneAndHalf,
            _ => Hysteresis::Three,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Mcp9808Config {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Mcp9808Config({=u16:#x})", self.bits())
    }
}

/// Limit hysteresis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Hysteresis {
    /// 0 °C
    Zero = 0,
    /// 0.5 °C
    Half = 1,
    /// 1.5 °C
    OneAndHalf = 2,
    /// 3.0 °C
    Three = 3,
}

/// Progress through a register read
///
/// ```text
/// Idle → AddressWritten → DirectionSwitched → MsbReceived → LsbReceived → Idle
/// ```
///
/// Any bus error drops straight back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadPhase {
    /// No transaction in progress
    Idle,
    /// Register pointer sent
    AddressWritten,
    /// Switched to receive for the repeated START
    DirectionSwitched,
    /// First data byte in
    MsbReceived,
    /// Second data byte in, STOP issued
    LsbReceived,
}

impl ReadPhase {
    /// Phase after the current step succeeds
    pub fn next(self) -> Self {
        match self {
            ReadPhase::Idle => ReadPhase::AddressWritten,
            ReadPhase::AddressWritten => ReadPhase::DirectionSwitched,
            ReadPhase::DirectionSwitched => ReadPhase::MsbReceived,
            ReadPhase::MsbReceived => ReadPhase::LsbReceived,
            ReadPhase::LsbReceived => ReadPhase::Idle,
        }
    }
}

/// MCP9808 on a byte-level I2C bus
pub struct Mcp9808<B> {
    bus: B,
    address: SlaveAddress,
    last_abort: Option<ReadPhase>,
}

impl<B: I2cBus> Mcp9808<B> {
    /// Bind to the sensor at `address`
    ///
    /// Loads the slave address into the bus before any transaction.
    pub fn new(mut bus: B, address: SlaveAddress) -> Self {
        bus.set_slave_address(address);
        Self {
            bus,
            address,
            last_abort: None,
        }
    }

    /// Sensor address
    pub fn address(&self) -> SlaveAddress {
        self.address
    }

    /// Phase the most recent failed read stopped in
    ///
    /// Cleared by the next successful read.
    pub fn last_abort(&self) -> Option<ReadPhase> {
        self.last_abort
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Read a 16-bit register
    pub fn read_register(&mut self, register: u8) -> Result<u16, BusError> {
        let mut phase = ReadPhase::Idle;

        match self.read_sequence(register, &mut phase) {
            Ok(value) => {
                self.last_abort = None;
                Ok(value)
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "MCP9808 read of reg {=u8:#x} aborted after {}: {}",
                    register,
                    phase,
                    e
                );

                self.last_abort = Some(phase);
                Err(e)
            }
        }
    }

    fn read_sequence(&mut self, register: u8, phase: &mut ReadPhase) -> Result<u16, BusError> {
        self.bus.set_direction(Direction::Write);
        self.bus.send_byte(register, POINTER_WRITE)?;
        *phase = phase.next();

        self.bus.set_direction(Direction::Read);
        *phase = phase.next();

        let msb = self.bus.receive_byte(FIRST_READ)?;
        *phase = phase.next();

        let lsb = self.bus.receive_byte(LAST_READ)?;
        *phase = phase.next();

        Ok(u16::from_be_bytes([msb, lsb]))
    }

    /// Write a 16-bit register
    pub fn write_register_16(&mut self, register: u8, value: u16) -> Result<(), BusError> {
        let [msb, lsb] = value.to_be_bytes();

        self.bus.set_direction(Direction::Write);
        self.bus.send_byte(register, POINTER_WRITE)?;
        self.bus.send_byte(msb, DATA_WRITE)?;
        self.bus.send_byte(lsb, LAST_WRITE)
    }

    /// Read and decode the ambient-temperature register
    pub fn read_ambient(&mut self) -> Result<AmbientReading, BusError> {
        self.read_register(reg::AMBIENT).map(AmbientReading::decode)
    }

    /// Current temperature in whole degrees Fahrenheit
    pub fn read_ambient_fahrenheit(&mut self) -> Result<i32, BusError> {
        self.read_ambient().map(|r| r.temperature.fahrenheit())
    }

    /// Write the configuration register
    pub fn configure(&mut self, config: Mcp9808Config) -> Result<(), BusError> {
        self.write_register_16(reg::CONFIG, config.bits())
    }

    /// Read the configuration register
    pub fn read_config(&mut self) -> Result<Mcp9808Config, BusError> {
        self.read_register(reg::CONFIG)
            .map(Mcp9808Config::from_bits_retain)
    }

    /// Set the upper alert boundary (0.25 °C resolution)
    pub fn set_upper_limit(&mut self, limit: Temperature) -> Result<(), BusError> {
        self.write_register_16(reg::UPPER_LIMIT, limit.to_limit_register())
    }

    /// Set the lower alert boundary (0.25 °C resolution)
    pub fn set_lower_limit(&mut self, limit: Temperature) -> Result<(), BusError> {
        self.write_register_16(reg::LOWER_LIMIT, limit.to_limit_register())
    }

    /// Set the critical boundary (0.25 °C resolution)
    pub fn set_critical_limit(&mut self, limit: Temperature) -> Result<(), BusError> {
        self.write_register_16(reg::CRITICAL_LIMIT, limit.to_limit_register())
    }

    /// Read back one of the limit registers
    pub fn read_limit(&mut self, register: u8) -> Result<Temperature, BusError> {
        self.read_register(register).map(Temperature::from_register)
    }

    /// Check that an MCP9808 is answering at this address
    pub fn verify_identity(&mut self) -> Result<(), SensorError> {
        let manufacturer = self.read_register(reg::MANUFACTURER_ID)?;
        let [device, _revision] = self.read_register(reg::DEVICE_ID)?.to_be_bytes();

        if manufacturer != MANUFACTURER_ID || device != DEVICE_ID {
            return Err(SensorError::UnexpectedDevice {
                manufacturer,
                device,
            });
        }

        Ok(())
    }
}

impl<B: I2cBus> TemperatureSensor for Mcp9808<B> {
    fn read_temperature(&mut self) -> Result<Temperature, SensorError> {
        let reading = self.read_ambient()?;
        Ok(reading.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::fake::{BusEvent, FakeRegisters, Reply};
    use crate::i2c::I2cMaster;
    use proptest::prelude::*;
    use tempwatch_hal::i2c::I2cConfig;
    use tempwatch_hal::{Polling, Status};

    type Sensor = Mcp9808<I2cMaster<FakeRegisters>>;

    const NACK: Status = Status::ERROR.union(Status::DATA_NACK);

    fn new_sensor(replies: &[Reply]) -> Sensor {
        let mut regs = FakeRegisters::new();
        for reply in replies {
            regs.reply(*reply);
        }
        let mut master = I2cMaster::new(regs, Polling::Unbounded);
        master.initialize(&I2cConfig::STANDARD).unwrap();
        Mcp9808::new(master, SlaveAddress::new(DEFAULT_ADDRESS).unwrap())
    }

    fn wire(sensor: Sensor) -> FakeRegisters {
        sensor.release().release().0
    }

    #[test]
    fn test_read_register_sequence() {
        let mut sensor = new_sensor(&[Reply::ok(), Reply::data(0x01), Reply::data(0x00)]);
        assert_eq!(sensor.read_register(reg::AMBIENT), Ok(0x0100));
        assert_eq!(sensor.last_abort(), None);

        let regs = wire(sensor);
        assert_eq!(
            regs.events.as_slice(),
            &[
                BusEvent::Start(0x30),
                BusEvent::Transmit(reg::AMBIENT),
                BusEvent::Start(0x31),
                BusEvent::Receive(0x01),
                BusEvent::Receive(0x00),
                BusEvent::Stop,
            ]
        );
        assert!(regs.transactions_closed());
    }

    #[test]
    fn test_ambient_end_to_end() {
        // 16.0 °C -> 60.8 °F
        let mut sensor = new_sensor(&[Reply::ok(), Reply::data(0x01), Reply::data(0x00)]);
        assert_eq!(sensor.read_ambient_fahrenheit(), Ok(61));
    }

    #[test]
    fn test_trait_fahrenheit_reports_sensor_error() {
        let mut sensor = new_sensor(&[Reply::ok(), Reply::data(0x01), Reply::data(0x00)]);
        assert_eq!(TemperatureSensor::read_fahrenheit(&mut sensor), Ok(61));

        let mut sensor = new_sensor(&[Reply::error(NACK)]);
        assert_eq!(
            TemperatureSensor::read_fahrenheit(&mut sensor),
            Err(SensorError::Bus(BusError::DataNack(NACK)))
        );
    }

    #[test]
    fn test_negative_ambient() {
        let mut sensor = new_sensor(&[Reply::ok(), Reply::data(0x1E), Reply::data(0xC0)]);
        assert_eq!(sensor.read_celsius_x10(), Ok(-200));

        let mut sensor = new_sensor(&[Reply::ok(), Reply::data(0x1E), Reply::data(0xC0)]);
        assert_eq!(sensor.read_ambient_fahrenheit(), Ok(-4));
    }

    #[test]
    fn test_flags_in_reading() {
        let mut sensor = new_sensor(&[Reply::ok(), Reply::data(0xC1), Reply::data(0x90)]);
        let reading = sensor.read_ambient().unwrap();
        assert!(reading.flags.contains(tempwatch_core::temperature::AlertFlags::CRITICAL));
        assert_eq!(reading.temperature.celsius_x10(), 250);
    }

    #[test]
    fn test_msb_nack_aborts_read() {
        let mut sensor = new_sensor(&[Reply::ok(), Reply::error(NACK)]);
        assert_eq!(
            sensor.read_register(reg::AMBIENT),
            Err(BusError::DataNack(NACK))
        );
        assert_eq!(sensor.last_abort(), Some(ReadPhase::DirectionSwitched));

        let regs = wire(sensor);
        assert_eq!(
            regs.events.as_slice(),
            &[
                BusEvent::Start(0x30),
                BusEvent::Transmit(reg::AMBIENT),
                BusEvent::Start(0x31),
                BusEvent::Abort,
            ]
        );
    }

    #[test]
    fn test_lsb_nack_discards_msb() {
        let mut sensor = new_sensor(&[Reply::ok(), Reply::data(0x01), Reply::error(NACK)]);
        assert_eq!(
            sensor.read_ambient_fahrenheit(),
            Err(BusError::DataNack(NACK))
        );
        assert_eq!(sensor.last_abort(), Some(ReadPhase::MsbReceived));
        assert!(wire(sensor).transactions_closed());
    }

    #[test]
    fn test_address_nack() {
        let flags = Status::ERROR | Status::ADDRESS_NACK;
        let mut sensor = new_sensor(&[Reply::error(flags)]);
        assert_eq!(
            sensor.read_temperature(),
            Err(SensorError::Bus(BusError::AddressNack(flags)))
        );
        assert_eq!(sensor.last_abort(), Some(ReadPhase::Idle));
    }

    #[test]
    fn test_successful_read_clears_abort() {
        let mut sensor = new_sensor(&[
            Reply::error(NACK),
            Reply::ok(),
            Reply::data(0x00),
            Reply::data(0x00),
        ]);
        assert!(sensor.read_register(reg::AMBIENT).is_err());
        assert_eq!(sensor.read_register(reg::AMBIENT), Ok(0));
        assert_eq!(sensor.last_abort(), None);
    }

    #[test]
    fn test_write_register_sequence() {
        let mut sensor = new_sensor(&[]);
        let limit = Temperature::from_celsius(30).unwrap();
        assert_eq!(sensor.set_upper_limit(limit), Ok(()));

        let regs = wire(sensor);
        assert_eq!(
            regs.events.as_slice(),
            &[
                BusEvent::Start(0x30),
                BusEvent::Transmit(reg::UPPER_LIMIT),
                BusEvent::Transmit(0x01),
                BusEvent::Transmit(0xE0),
                BusEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_write_error_skips_remaining_bytes() {
        let mut sensor = new_sensor(&[Reply::ok(), Reply::error(NACK)]);
        assert_eq!(
            sensor.write_register_16(reg::LOWER_LIMIT, 0x1234),
            Err(BusError::DataNack(NACK))
        );

        let regs = wire(sensor);
        assert_eq!(
            regs.events.as_slice(),
            &[
                BusEvent::Start(0x30),
                BusEvent::Transmit(reg::LOWER_LIMIT),
                BusEvent::Abort,
            ]
        );
    }

    #[test]
    fn test_negative_limit() {
        let mut sensor = new_sensor(&[]);
        let limit = Temperature::from_celsius(-10).unwrap();
        sensor.set_lower_limit(limit).unwrap();

        let regs = wire(sensor);
        assert_eq!(regs.events[2], BusEvent::Transmit(0x1F));
        assert_eq!(regs.events[3], BusEvent::Transmit(0x60));
    }

    #[test]
    fn test_read_limit() {
        let mut sensor = new_sensor(&[Reply::ok(), Reply::data(0x02), Reply::data(0xD0)]);
        let limit = sensor.read_limit(reg::CRITICAL_LIMIT).unwrap();
        assert_eq!(limit, Temperature::from_celsius(45).unwrap());
    }

    #[test]
    fn test_configure() {
        let mut sensor = new_sensor(&[]);
        sensor.configure(Mcp9808Config::INTERRUPT_ALERTS).unwrap();

        let regs = wire(sensor);
        assert_eq!(
            &regs.events[1..4],
            &[
                BusEvent::Transmit(reg::CONFIG),
                BusEvent::Transmit(0x00),
                BusEvent::Transmit(0x09),
            ]
        );
    }

    #[test]
    fn test_read_config() {
        let mut sensor = new_sensor(&[Reply::ok(), Reply::data(0x02), Reply::data(0x18)]);
        let config = sensor.read_config().unwrap();
        assert!(config.contains(Mcp9808Config::ALERT_ENABLE | Mcp9808Config::ALERT_STATUS));
        assert_eq!(config.hysteresis(), Hysteresis::Half);
    }

    #[test]
    fn test_hysteresis_field() {
        let config = Mcp9808Config::INTERRUPT_ALERTS.with_hysteresis(Hysteresis::Three);
        assert_eq!(config.bits(), 0x0609);
        assert_eq!(config.hysteresis(), Hysteresis::Three);

        let config = config.with_hysteresis(Hysteresis::Zero);
        assert_eq!(config, Mcp9808Config::INTERRUPT_ALERTS);
    }

    #[test]
    fn test_verify_identity() {
        let mut sensor = new_sensor(&[
            Reply::ok(),
            Reply::data(0x00),
            Reply::data(0x54),
            Reply::ok(),
            Reply::data(0x04),
            Reply::data(0x01),
        ]);
        assert_eq!(sensor.verify_identity(), Ok(()));
    }

    #[test]
    fn test_verify_identity_mismatch() {
        let mut sensor = new_sensor(&[
            Reply::ok(),
            Reply::data(0x00),
            Reply::data(0x54),
            Reply::ok(),
            Reply::data(0x75),
            Reply::data(0x00),
        ]);
        assert_eq!(
            sensor.verify_identity(),
            Err(SensorError::UnexpectedDevice {
                manufacturer: 0x0054,
                device: 0x75,
            })
        );
    }

    #[test]
    fn test_read_phase_cycle() {
        let mut phase = ReadPhase::Idle;
        for expected in [
            ReadPhase::AddressWritten,
            ReadPhase::DirectionSwitched,
            ReadPhase::MsbReceived,
            ReadPhase::LsbReceived,
            ReadPhase::Idle,
        ] {
            phase = phase.next();
            assert_eq!(phase, expected);
        }
    }

    proptest! {
        #[test]
        fn prop_read_start_paired_with_one_stop(fail_at in 0usize..4, fault in prop_oneof![
            Just(NACK),
            Just(Status::ERROR | Status::ADDRESS_NACK),
            Just(Status::ARBITRATION_LOST),
        ]) {
            // Transfer 0 writes the pointer, 1 and 2 read; 3 means no failure
            let mut replies = [Reply::data(0x01); 3];
            if fail_at < 3 {
                replies[fail_at] = Reply::error(fault);
            }

            let mut sensor = new_sensor(&replies);
            let result = sensor.read_register(reg::AMBIENT);
            prop_assert_eq!(result.is_ok(), fail_at == 3);
            if let Err(e) = result {
                prop_assert_eq!(e.flags(), fault);
            }

            let regs = wire(sensor);
            prop_assert!(regs.transactions_closed());
            prop_assert_eq!(regs.stop_count(), 1);
            prop_assert!(!regs.is_held());
        }

        #[test]
        fn prop_write_start_paired_with_one_stop(fail_at in 0usize..4, value in any::<u16>()) {
            let mut replies = [Reply::ok(); 3];
            if fail_at < 3 {
                replies[fail_at] = Reply::error(NACK);
            }

            let mut sensor = new_sensor(&replies);
            let result = sensor.write_register_16(reg::CONFIG, value);
            prop_assert_eq!(result.is_ok(), fail_at == 3);

            let regs = wire(sensor);
            prop_assert!(regs.transactions_closed());
            prop_assert_eq!(regs.stop_count(), 1);
        }
    }
}
