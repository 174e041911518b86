//! UART0 console transmitter
//!
//! UART0 is wired to the debug probe's virtual COM port on the
//! LaunchPad (PA0 RX, PA1 TX).

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

use tempwatch_hal::uart::{DataBits, Parity, StopBits, UartConfig, UartTx};

use crate::gpio::{self, AltFunction, Port};
use crate::mmio::Reg;
use crate::sysctl::{self, Gate};

const UART0_BASE: usize = 0x4000_C000;

const DR: Reg = Reg::at(UART0_BASE, 0x000);
const FR: Reg = Reg::at(UART0_BASE, 0x018);
const IBRD: Reg = Reg::at(UART0_BASE, 0x024);
const FBRD: Reg = Reg::at(UART0_BASE, 0x028);
const LCRH: Reg = Reg::at(UART0_BASE, 0x02C);
const CTL: Reg = Reg::at(UART0_BASE, 0x030);
const CC: Reg = Reg::at(UART0_BASE, 0xFC8);

const FR_BUSY: u32 = 1 << 3;
const FR_TXFF: u32 = 1 << 5;

const LCRH_PEN: u32 = 1 << 1;
const LCRH_EPS: u32 = 1 << 2;
const LCRH_STP2: u32 = 1 << 3;
const LCRH_FEN: u32 = 1 << 4;
const LCRH_WLEN_7: u32 = 0x2 << 5;
const LCRH_WLEN_8: u32 = 0x3 << 5;

const CTL_UARTEN: u32 = 1 << 0;
const CTL_TXE: u32 = 1 << 8;
const CTL_RXE: u32 = 1 << 9;

/// Baud clock source: system clock
const CC_SYSCLK: u32 = 0x0;

/// PA0 and PA1 routed to UART0
pub const UART0_PINS: AltFunction = AltFunction {
    port: Port::A,
    pins: (1 << 0) | (1 << 1),
    mux: 1,
    open_drain: 0,
};

static TAKEN: AtomicBool = AtomicBool::new(false);

/// Error from UART setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartSetupError {
    /// Baud rate cannot be generated from the system clock
    Baudrate,
    /// UART0 was already taken
    AlreadyTaken,
}

/// Line control value (UARTLCRH) for a frame format, FIFOs enabled
pub const fn line_control(config: &UartConfig) -> u32 {
    let mut lcrh = LCRH_FEN;

    lcrh |= match config.data_bits {
        DataBits::Seven => LCRH_WLEN_7,
        DataBits::Eight => LCRH_WLEN_8,
    };
    lcrh |= match config.parity {
        Parity::None => 0,
        Parity::Odd => LCRH_PEN,
        Parity::Even => LCRH_PEN | LCRH_EPS,
    };
    if let StopBits::Two = config.stop_bits {
        lcrh |= LCRH_STP2;
    }

    lcrh
}

/// Exclusive handle to the UART0 transmitter
#[derive(Debug)]
pub struct Uart0 {
    _private: (),
}

impl Uart0 {
    /// Claim UART0 and configure it for `config` at `clock_hz`
    pub fn take(config: &UartConfig, clock_hz: u32) -> Result<Self, UartSetupError> {
        let (integer, fraction) = config
            .divisors(clock_hz)
            .ok_or(UartSetupError::Baudrate)?;

        if TAKEN.swap(true, Ordering::AcqRel) {
            return Err(UartSetupError::AlreadyTaken);
        }

        sysctl::enable(Gate::Uart, 0);
        gpio::route(&UART0_PINS);

        // Divisors and frame format only latch while disabled
        CTL.clear_bits(CTL_UARTEN);
        IBRD.write(u32::from(integer));
        FBRD.write(u32::from(fraction));
        LCRH.write(line_control(config));
        CC.write(CC_SYSCLK);
        CTL.write(CTL_UARTEN | CTL_TXE | CTL_RXE);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "UART0 at {} baud (IBRD={}, FBRD={})",
            config.baudrate,
            integer,
            fraction
        );

        Ok(Self { _private: () })
    }
}

impl UartTx for Uart0 {
    type Error = Infallible;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            while FR.read() & FR_TXFF != 0 {}
            DR.write(u32::from(byte));
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while FR.read() & FR_BUSY != 0 {}
        Ok(())
    }
}
