//! Busy-wait delay counted in core clock cycles

use embedded_hal::delay::DelayNs;

/// Blocking delay for a core running at a fixed clock
#[derive(Debug, Clone, Copy)]
pub struct BusyDelay {
    cycles_per_us: u32,
}

impl BusyDelay {
    pub const fn new(system_clock_hz: u32) -> Self {
        let cycles_per_us = system_clock_hz / 1_000_000;
        Self {
            cycles_per_us: if cycles_per_us == 0 { 1 } else { cycles_per_us },
        }
    }

    /// Core cycles needed to cover `ns` nanoseconds, at least one
    pub const fn cycles_for_ns(&self, ns: u32) -> u32 {
        let cycles = (ns as u64 * self.cycles_per_us as u64).div_ceil(1_000);
        if cycles == 0 {
            1
        } else if cycles > u32::MAX as u64 {
            u32::MAX
        } else {
            cycles as u32
        }
    }
}

impl DelayNs for BusyDelay {
    fn delay_ns(&mut self, ns: u32) {
        cortex_m::asm::delay(self.cycles_for_ns(ns));
    }

    fn delay_us(&mut self, us: u32) {
        for _ in 0..us {
            cortex_m::asm::delay(self.cycles_per_us);
        }
    }
}
