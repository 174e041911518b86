//! I2C bus drivers

pub mod master;

#[cfg(test)]
pub(crate) mod fake;

pub use master::I2cMaster;
