//! System control: peripheral clock gating

use crate::mmio::Reg;

const SYSCTL_BASE: usize = 0x400F_E000;

const RCGCGPIO: Reg = Reg::at(SYSCTL_BASE, 0x608);
const RCGCUART: Reg = Reg::at(SYSCTL_BASE, 0x618);
const RCGCI2C: Reg = Reg::at(SYSCTL_BASE, 0x620);
const PRGPIO: Reg = Reg::at(SYSCTL_BASE, 0xA08);
const PRUART: Reg = Reg::at(SYSCTL_BASE, 0xA18);
const PRI2C: Reg = Reg::at(SYSCTL_BASE, 0xA20);

/// Clock-gated peripheral family
#[derive(Debug, Clone, Copy)]
pub(crate) enum Gate {
    Gpio,
    Uart,
    I2c,
}

impl Gate {
    fn registers(self) -> (Reg, Reg) {
        match self {
            Gate::Gpio => (RCGCGPIO, PRGPIO),
            Gate::Uart => (RCGCUART, PRUART),
            Gate::I2c => (RCGCI2C, PRI2C),
        }
    }
}

/// Start the clock to module `index` and wait until it is ready
pub(crate) fn enable(gate: Gate, index: u8) {
    let (clock, ready) = gate.registers();
    let mask = 1 << index;

    clock.set_bits(mask);
    while ready.read() & mask == 0 {}
}
