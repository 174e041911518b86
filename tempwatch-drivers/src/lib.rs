//! Hardware driver implementations
//!
//! This crate provides concrete implementations on top of the traits
//! defined in tempwatch-hal and tempwatch-core:
//!
//! - Single-master I2C bus driver over a raw register file
//! - MCP9808 digital temperature sensor

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod sensor;
