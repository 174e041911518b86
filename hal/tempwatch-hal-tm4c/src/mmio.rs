//! Volatile access to memory-mapped peripheral registers

use core::ptr::{read_volatile, write_volatile};

/// One 32-bit peripheral register
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reg(usize);

impl Reg {
    pub(crate) const fn at(base: usize, offset: usize) -> Self {
        Self(base + offset)
    }

    pub(crate) fn read(self) -> u32 {
        // SAFETY: only constructed for fixed, aligned TM4C123 peripheral
        // register addresses, which are always mapped.
        unsafe { read_volatile(self.0 as *const u32) }
    }

    pub(crate) fn write(self, value: u32) {
        // SAFETY: see `read`.
        unsafe { write_volatile(self.0 as *mut u32, value) }
    }

    pub(crate) fn modify(self, f: impl FnOnce(u32) -> u32) {
        self.write(f(self.read()))
    }

    pub(crate) fn set_bits(self, mask: u32) {
        self.modify(|v| v | mask)
    }

    pub(crate) fn clear_bits(self, mask: u32) {
        self.modify(|v| v & !mask)
    }
}
