//! Tempwatch Hardware Abstraction Layer
//!
//! This crate defines the bus vocabulary and hardware abstraction traits
//! that chip-specific HALs (TM4C123, ...) implement. Drivers and the
//! sensor protocol are written against these traits only, which lets the
//! whole protocol stack run on the host against a simulated register file.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (tempwatch-firmware)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tempwatch-drivers (I2C master, MCP9808)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tempwatch-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ tempwatch-hal-│
//!             │     tm4c      │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::MasterRegisters`] - Raw I2C master register file
//! - [`i2c::PollStrategy`] - How to wait for the bus engine to go idle
//! - [`i2c::I2cBus`] - Byte-level I2C master operations
//! - [`uart::UartTx`] - Serial text output

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use i2c::{
    BusError, Conditions, Direction, I2cBus, I2cConfig, MasterRegisters, PollStrategy, Polling,
    SlaveAddress, Status,
};
pub use uart::{UartConfig, UartTx};
