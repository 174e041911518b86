//! Single-master I2C bus driver
//!
//! Drives the master transfer engine one byte at a time. Each transfer
//! loads the data register (for writes), writes the requested
//! [`Conditions`] to the control register, then busy-polls the status
//! register until the engine is idle.
//!
//! # Bus release
//!
//! Whenever a transfer reports an error, or the poll strategy gives up,
//! the driver writes a lone STOP before returning. A failed transfer can
//! therefore never leave the bus held. Writing STOP to an already idle
//! bus is harmless.
//!
//! # Sharing
//!
//! The driver owns its register file and every operation takes
//! `&mut self`. There is no internal locking: if the bus must be shared
//! between execution contexts, wrap the driver in a mutex and hold it
//! across a whole register transaction.

use tempwatch_hal::i2c::{I2cConfig, I2cConfigError};
use tempwatch_hal::{
    BusError, Conditions, Direction, I2cBus, MasterRegisters, PollStrategy, Polling,
    SlaveAddress,
};

/// Direction bit in the slave address register
const DIRECTION_BIT: u8 = 0x01;

/// I2C master over a raw register file
pub struct I2cMaster<R, P = Polling> {
    regs: R,
    poll: P,
}

impl<R: MasterRegisters, P: PollStrategy> I2cMaster<R, P> {
    /// Wrap a register file
    ///
    /// The bus is not touched until [`initialize`](Self::initialize).
    pub fn new(regs: R, poll: P) -> Self {
        Self { regs, poll }
    }

    /// Enable master mode and program the SCL timer
    ///
    /// Calling this again reprograms the same values. It must not be
    /// called while a transaction is in flight.
    pub fn initialize(&mut self, config: &I2cConfig) -> Result<(), I2cConfigError> {
        // Reject before touching any register
        let period = config.timer_period()?;

        self.regs.enable_master();
        self.regs.set_timer_period(period);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "I2C master enabled: {} Hz SCL, TPR={}",
            config.frequency,
            period
        );

        Ok(())
    }

    /// Direction the next addressed phase will use
    pub fn direction(&self) -> Direction {
        if self.regs.address() & DIRECTION_BIT != 0 {
            Direction::Read
        } else {
            Direction::Write
        }
    }

    /// 7-bit address currently loaded
    pub fn slave_address(&self) -> u8 {
        self.regs.address() >> 1
    }

    /// Force a STOP to release the bus
    pub fn abort(&mut self) {
        self.regs.write_control(Conditions::STOP);
    }

    /// Give back the register file and poll strategy
    pub fn release(self) -> (R, P) {
        (self.regs, self.poll)
    }

    /// Wait for the engine, then check the outcome of the transfer
    fn finish(&mut self) -> Result<(), BusError> {
        let Self { regs, poll } = self;
        if !poll.wait_ready(|| regs.status().is_busy()) {
            self.abort();

            #[cfg(feature = "defmt")]
            defmt::warn!("I2C transfer timed out, bus released");

            return Err(BusError::Timeout);
        }

        let status = self.regs.status();
        match BusError::from_status(status) {
            Some(error) => {
                self.abort();

                #[cfg(feature = "defmt")]
                defmt::warn!("I2C transfer failed: {}", error);

                Err(error)
            }
            None => Ok(()),
        }
    }
}

impl<R: MasterRegisters, P: PollStrategy> I2cBus for I2cMaster<R, P> {
    fn set_direction(&mut self, direction: Direction) {
        let msa = self.regs.address();
        self.regs
            .set_address((msa & !DIRECTION_BIT) | direction.bit());
    }

    fn set_slave_address(&mut self, address: SlaveAddress) {
        // Replace the address bits, keep the direction bit
        let msa = self.regs.address();
        self.regs
            .set_address((address.get() << 1) | (msa & DIRECTION_BIT));
    }

    fn send_byte(&mut self, data: u8, conditions: Conditions) -> Result<(), BusError> {
        self.regs.write_data(data);
        self.regs.write_control(conditions);
        self.finish()
    }

    fn receive_byte(&mut self, conditions: Conditions) -> Result<u8, BusError> {
        self.regs.write_control(conditions);
        self.finish()?;
        Ok(self.regs.read_data())
    }
}
