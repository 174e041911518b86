//! I2C1 master register file
//!
//! I2C1 sits on PA6 (SCL) and PA7 (SDA). SDA is open-drain; SCL is
//! driven by the module's own clock output.

use core::sync::atomic::{AtomicBool, Ordering};

use tempwatch_hal::{Conditions, MasterRegisters, Status};

use crate::gpio::{self, AltFunction, Port};
use crate::mmio::Reg;
use crate::sysctl::{self, Gate};

const I2C1_BASE: usize = 0x4002_1000;

const MSA: Reg = Reg::at(I2C1_BASE, 0x000);
const MCS: Reg = Reg::at(I2C1_BASE, 0x004);
const MDR: Reg = Reg::at(I2C1_BASE, 0x008);
const MTPR: Reg = Reg::at(I2C1_BASE, 0x00C);
const MCR: Reg = Reg::at(I2C1_BASE, 0x020);

/// Master function enable
const MCR_MFE: u32 = 1 << 4;

/// PA6 and PA7 routed to I2C1
pub const I2C1_PINS: AltFunction = AltFunction {
    port: Port::A,
    pins: (1 << 6) | (1 << 7),
    mux: 3,
    open_drain: 1 << 7,
};

static TAKEN: AtomicBool = AtomicBool::new(false);

/// Exclusive handle to the I2C1 master registers
#[derive(Debug)]
pub struct I2c1 {
    _private: (),
}

impl I2c1 {
    /// Claim I2C1, start its clocks and route its pins
    ///
    /// Returns `None` if the handle was already taken. Master mode is not
    /// enabled here; the bus driver does that in `initialize`.
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            return None;
        }

        sysctl::enable(Gate::I2c, 1);
        gpio::route(&I2C1_PINS);

        #[cfg(feature = "defmt")]
        defmt::debug!("I2C1 clocked, PA6/PA7 routed");

        Some(Self { _private: () })
    }
}

impl MasterRegisters for I2c1 {
    fn enable_master(&mut self) {
        MCR.write(MCR_MFE);
    }

    fn set_timer_period(&mut self, period: u8) {
        MTPR.write(u32::from(period));
    }

    fn address(&self) -> u8 {
        MSA.read() as u8
    }

    fn set_address(&mut self, value: u8) {
        MSA.write(u32::from(value));
    }

    fn write_data(&mut self, byte: u8) {
        MDR.write(u32::from(byte));
    }

    fn read_data(&mut self) -> u8 {
        MDR.read() as u8
    }

    fn write_control(&mut self, conditions: Conditions) {
        MCS.write(u32::from(conditions.bits()));
    }

    fn status(&mut self) -> Status {
        Status::from_bits_truncate(MCS.read() as u8)
    }
}
