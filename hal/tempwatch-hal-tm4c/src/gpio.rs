//! GPIO alternate-function routing for TM4C123
//!
//! Peripherals reach their pins through three per-port settings: the
//! alternate-function select bit, the digital enable bit, and a 4-bit
//! port-mux code per pin in GPIOPCTL.

use crate::mmio::Reg;
use crate::sysctl::{self, Gate};

const AFSEL: usize = 0x420;
const ODR: usize = 0x50C;
const DEN: usize = 0x51C;
const PCTL: usize = 0x52C;

/// GPIO port (APB aperture)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Port {
    /// Register block base address
    pub const fn base(self) -> usize {
        match self {
            Port::A => 0x4000_4000,
            Port::B => 0x4000_5000,
            Port::C => 0x4000_6000,
            Port::D => 0x4000_7000,
            Port::E => 0x4002_4000,
            Port::F => 0x4002_5000,
        }
    }

    /// Clock gate bit index
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Pins and mux code for one peripheral function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AltFunction {
    /// Port the pins live on
    pub port: Port,
    /// Pin mask (bit n = pin n)
    pub pins: u8,
    /// Port-mux code written to PCTL for each pin
    pub mux: u8,
    /// Pins that must be open-drain
    pub open_drain: u8,
}

/// GPIOPCTL field mask and value for `pins` set to `mux`
pub const fn pctl_fields(pins: u8, mux: u8) -> (u32, u32) {
    let mut mask = 0u32;
    let mut value = 0u32;
    let mut pin = 0;
    while pin < 8 {
        if pins & (1 << pin) != 0 {
            mask |= 0xF << (pin * 4);
            value |= ((mux & 0xF) as u32) << (pin * 4);
        }
        pin += 1;
    }
    (mask, value)
}

/// Hand the function's pins over to their peripheral
pub(crate) fn route(function: &AltFunction) {
    sysctl::enable(Gate::Gpio, function.port.index());

    let base = function.port.base();
    let pins = function.pins as u32;

    Reg::at(base, AFSEL).set_bits(pins);
    Reg::at(base, ODR).modify(|v| {
        (v & !pins) | (function.open_drain as u32 & pins)
    });
    Reg::at(base, DEN).set_bits(pins);

    let (mask, value) = pctl_fields(function.pins, function.mux);
    Reg::at(base, PCTL).modify(|v| (v & !mask) | value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pctl_i2c1_pins() {
        // PA6/PA7 to I2C1 (code 3)
        assert_eq!(pctl_fields(0xC0, 3), (0xFF00_0000, 0x3300_0000));
    }

    #[test]
    fn test_pctl_uart0_pins() {
        // PA0/PA1 to UART0 (code 1)
        assert_eq!(pctl_fields(0x03, 1), (0x0000_00FF, 0x0000_0011));
    }

    #[test]
    fn test_port_index() {
        assert_eq!(Port::A.index(), 0);
        assert_eq!(Port::F.index(), 5);
    }
}
