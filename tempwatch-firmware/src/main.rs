//! Tempwatch - MCP9808 Temperature Monitor Firmware
//!
//! Main firmware binary for TM4C123-based boards. Reads an MCP9808 over
//! I2C1 once per poll interval and prints the temperature in degrees
//! Fahrenheit on the UART0 console.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embedded_hal::delay::DelayNs;
use {defmt_rtt as _, panic_probe as _};

use tempwatch_core::report::ReportLine;
use tempwatch_core::traits::SensorError;
use tempwatch_drivers::i2c::I2cMaster;
use tempwatch_drivers::sensor::Mcp9808;
use tempwatch_hal_tm4c::delay::BusyDelay;
use tempwatch_hal_tm4c::i2c::I2c1;
use tempwatch_hal_tm4c::uart::Uart0;

use crate::console::Console;

mod config;
mod console;
mod session;

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Tempwatch firmware starting...");

    let config = config::load();
    let board = config.board;

    let uart = match Uart0::take(&board.uart(), board.system_clock_hz) {
        Ok(uart) => uart,
        Err(e) => {
            error!("UART0 setup failed: {}", e);
            halt();
        }
    };
    let mut console = Console::new(uart);
    console.banner();

    let Some(i2c1) = I2c1::take() else {
        error!("I2C1 already taken");
        halt();
    };

    let mut bus = I2cMaster::new(i2c1, board.polling());
    if let Err(e) = bus.initialize(&board.i2c()) {
        error!("I2C init failed: {}", e);
        halt();
    }
    info!(
        "I2C1 at {} Hz, poll strategy {}",
        board.i2c_frequency_hz,
        board.polling()
    );

    let Some(address) = config.sensor.slave_address() else {
        error!("Invalid sensor address {=u8:#x}", config.sensor.address);
        halt();
    };
    let mut sensor = Mcp9808::new(bus, address);
    session::prepare(&mut sensor, &config.sensor);

    let mut delay = BusyDelay::new(board.system_clock_hz);

    info!("Polling every {} ms", config.poll_interval_ms);
    loop {
        let line = match sensor.read_ambient() {
            Ok(reading) => {
                info!("Temperature: {} F ({})", reading.temperature.fahrenheit(), reading);
                ReportLine::reading(&reading)
            }
            Err(e) => {
                warn!("Temperature read failed: {}", e);
                ReportLine::failure(&SensorError::Bus(e))
            }
        };
        console.report(&line);

        delay.delay_ms(config.poll_interval_ms);
    }
}

/// Park the core after an unrecoverable setup error
fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
