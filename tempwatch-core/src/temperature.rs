//! Ambient temperature encoding
//!
//! The MCP9808 ambient-temperature register packs three alert flags and a
//! 13-bit two's-complement temperature in 1/16 °C steps:
//!
//! ```text
//!   15    14    13    12   11 ........ 4   3 ....... 0
//! ┌─────┬─────┬─────┬────┬───────────────┬────────────┐
//! │CRIT │HIGH │ LOW │SIGN│  whole °C     │ 1/16 °C    │
//! └─────┴─────┴─────┴────┴───────────────┴────────────┘
//! ```
//!
//! Decoding is two explicit steps and the order matters: inspect the
//! flags with [`AlertFlags::inspect`] while they are still present, then
//! mask them off and decode with [`Temperature::from_register`].
//! [`AmbientReading::decode`] does both.
//!
//! All arithmetic is integer. Fahrenheit and tenths of a degree are
//! rounded to nearest, half away from zero.

use bitflags::bitflags;

/// Bits holding the alert flags
pub const FLAG_MASK: u16 = 0xE000;

/// Sign bit of the 13-bit temperature
pub const SIGN_BIT: u16 = 1 << 12;

/// Magnitude bits below the sign
pub const MAGNITUDE_MASK: u16 = 0x0FFF;

/// Bits a limit register keeps (0.25 °C resolution)
pub const LIMIT_MASK: u16 = 0x1FFC;

bitflags! {
    /// Alert comparator state reported with every ambient reading
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AlertFlags: u16 {
        /// Ambient is at or above the critical limit
        const CRITICAL = 1 << 15;
        /// Ambient is above the upper limit
        const ABOVE_UPPER = 1 << 14;
        /// Ambient is below the lower limit
        const BELOW_LOWER = 1 << 13;
    }
}

impl AlertFlags {
    /// Read the flags out of a raw ambient register value
    pub const fn inspect(raw: u16) -> Self {
        Self::from_bits_truncate(raw)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AlertFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "AlertFlags({=u16:#x})", self.bits())
    }
}

/// Temperature in sixteenths of a degree Celsius
///
/// Covers exactly what the 13-bit register field can hold:
/// -256.0 °C to +255.9375 °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    sixteenths: i16,
}

impl Temperature {
    /// Coldest representable value (-256 °C)
    pub const MIN: Self = Self { sixteenths: -4096 };

    /// Hottest representable value (255.9375 °C)
    pub const MAX: Self = Self { sixteenths: 4095 };

    /// Build from sixteenths of a degree
    pub const fn from_sixteenths(sixteenths: i16) -> Option<Self> {
        if sixteenths < Self::MIN.sixteenths || sixteenths > Self::MAX.sixteenths {
            None
        } else {
            Some(Self { sixteenths })
        }
    }

    /// Build from whole degrees Celsius
    pub fn from_celsius(celsius: i16) -> Option<Self> {
        let sixteenths = celsius as i32 * 16;
        i16::try_from(sixteenths)
            .ok()
            .and_then(Self::from_sixteenths)
    }

    /// Build from tenths of a degree Celsius, rounded to the nearest sixteenth
    pub fn from_celsius_x10(celsius_x10: i16) -> Option<Self> {
        let sixteenths = div_round(celsius_x10 as i32 * 16, 10);
        i16::try_from(sixteenths)
            .ok()
            .and_then(Self::from_sixteenths)
    }

    /// Decode a register value, ignoring the alert flag bits
    pub const fn from_register(raw: u16) -> Self {
        let value = raw & !FLAG_MASK;
        let magnitude = (value & MAGNITUDE_MASK) as i16;

        if value & SIGN_BIT != 0 {
            // Sign set: the field reads 256 °C above the true value
            Self {
                sixteenths: magnitude - 4096,
            }
        } else {
            Self {
                sixteenths: magnitude,
            }
        }
    }

    /// Encode as a 13-bit two's-complement register field (flags clear)
    pub const fn to_register(self) -> u16 {
        (self.sixteenths as u16) & (SIGN_BIT | MAGNITUDE_MASK)
    }

    /// Encode for the upper/lower/critical limit registers
    ///
    /// Limits only have 0.25 °C resolution; the two lowest fraction bits
    /// are dropped, which rounds toward negative infinity.
    pub const fn to_limit_register(self) -> u16 {
        self.to_register() & LIMIT_MASK
    }

    /// Raw sixteenths of a degree Celsius
    pub const fn sixteenths(self) -> i16 {
        self.sixteenths
    }

    /// Tenths of a degree Celsius (e.g. 455 = 45.5 °C)
    pub fn celsius_x10(self) -> i16 {
        div_round(self.sixteenths as i32 * 10, 16) as i16
    }

    /// Whole degrees Fahrenheit
    ///
    /// `F = C * 9/5 + 32 = sixteenths * 9/80 + 32`
    pub fn fahrenheit(self) -> i32 {
        div_round(self.sixteenths as i32 * 9 + 32 * 80, 80)
    }
}

/// Integer division rounding half away from zero (positive divisor)
fn div_round(numerator: i32, divisor: i32) -> i32 {
    if numerator >= 0 {
        (numerator + divisor / 2) / divisor
    } else {
        (numerator - divisor / 2) / divisor
    }
}

/// One decoded ambient-temperature register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AmbientReading {
    /// Alert comparator flags at the time of the reading
    pub flags: AlertFlags,
    /// Temperature with the flags removed
    pub temperature: Temperature,
}

impl AmbientReading {
    /// Decode a raw register value: flags first, then temperature
    pub const fn decode(raw: u16) -> Self {
        let flags = AlertFlags::inspect(raw);
        let temperature = Temperature::from_register(raw);
        Self { flags, temperature }
    }

    /// Encode back into a register value
    pub const fn encode(&self) -> u16 {
        self.flags.bits() | self.temperature.to_register()
    }
}

/// Decode a raw ambient register value straight to whole degrees Fahrenheit
pub fn decode_ambient_temperature(raw: u16) -> i32 {
    AmbientReading::decode(raw).temperature.fahrenheit()
}

/// Build the register value a sensor would report for this temperature
pub const fn encode_ambient_temperature(temperature: Temperature, flags: AlertFlags) -> u16 {
    AmbientReading { flags, temperature }.encode()
}
