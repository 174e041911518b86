//! TM4C123-specific HAL for the Tempwatch firmware
//!
//! This crate implements the `tempwatch-hal` traits for the TM4C123GH6PM
//! (EK-TM4C123GXL LaunchPad) by direct register access:
//!
//! - [`i2c::I2c1`] - I2C1 master on PA6 (SCL) / PA7 (SDA)
//! - [`uart::Uart0`] - UART0 console on PA0 (RX) / PA1 (TX)
//! - [`delay::BusyDelay`] - Cycle-counted busy-wait delay
//!
//! Each peripheral can be taken once; the returned handle is the only
//! way to reach its registers.

#![no_std]

pub mod delay;
pub mod gpio;
pub mod i2c;
mod mmio;
mod sysctl;
pub mod uart;

// Re-export shared types from tempwatch-hal
pub use tempwatch_hal::i2c::I2cConfig;
pub use tempwatch_hal::uart::UartConfig;
