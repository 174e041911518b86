//! Serial console output

use defmt::*;
use tempwatch_core::report::ReportLine;
use tempwatch_hal::UartTx;

const BANNER: &str = "\r\nTempwatch MCP9808 monitor\r\n";

/// Report sink on top of a blocking UART transmitter
pub struct Console<U> {
    uart: U,
}

impl<U: UartTx> Console<U> {
    pub fn new(uart: U) -> Self {
        Self { uart }
    }

    /// Print the start-up banner
    pub fn banner(&mut self) {
        if self.uart.write_str_blocking(BANNER).is_err() {
            warn!("Console write failed");
        }
    }

    /// Print one report line and wait for it to leave the UART
    pub fn report(&mut self, line: &ReportLine) {
        self.write(line.as_bytes());
        if self.uart.flush().is_err() {
            warn!("Console flush failed");
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        if self.uart.write_blocking(bytes).is_err() {
            warn!("Console write failed");
        }
    }
}
