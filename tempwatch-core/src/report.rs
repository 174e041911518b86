//! Console report lines
//!
//! Formats what the firmware prints over serial. Lines are built in a
//! fixed-capacity buffer so no allocator is needed:
//!
//! ```text
//! Temperature = 61 deg F
//! Temperature = -4 deg F [high]
//! Temperature = unavailable (address nack)
//! ```

use core::fmt::Write;

use heapless::String;

use crate::temperature::{AlertFlags, AmbientReading};
use crate::traits::SensorError;

/// Capacity of one report line
///
/// The longest line (minimum temperature with all three flags) is well
/// under this.
pub const LINE_CAPACITY: usize = 64;

const PREFIX: &str = "Temperature = ";
const LINE_END: &str = "\r\n";

/// One formatted console line, terminated with CR LF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    text: String<LINE_CAPACITY>,
}

impl ReportLine {
    /// Line for a decoded reading, including any raised alert flags
    pub fn reading(reading: &AmbientReading) -> Self {
        let mut line = Self::start();
        line.push_fahrenheit(reading.temperature.fahrenheit());

        for (flag, tag) in [
            (AlertFlags::CRITICAL, " [crit]"),
            (AlertFlags::ABOVE_UPPER, " [high]"),
            (AlertFlags::BELOW_LOWER, " [low]"),
        ] {
            if reading.flags.contains(flag) {
                line.push(tag);
            }
        }

        line.finish()
    }

    /// Line for a plain Fahrenheit value
    pub fn fahrenheit(fahrenheit: i32) -> Self {
        let mut line = Self::start();
        line.push_fahrenheit(fahrenheit);
        line.finish()
    }

    /// Line for a failed reading
    pub fn failure(error: &SensorError) -> Self {
        let mut line = Self::start();
        line.push("unavailable (");
        line.push(error.as_str());
        line.push(")");
        line.finish()
    }

    /// Line text including the terminator
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Line as raw ASCII bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    fn start() -> Self {
        let mut line = Self {
            text: String::new(),
        };
        line.push(PREFIX);
        line
    }

    fn push_fahrenheit(&mut self, fahrenheit: i32) {
        // Sign indicator, then the unsigned magnitude
        if fahrenheit < 0 {
            self.push("-");
        }
        let _ = write!(self.text, "{} deg F", fahrenheit.unsigned_abs());
    }

    fn push(&mut self, s: &str) {
        // Capacity covers every line this module builds
        let _ = self.text.push_str(s);
    }

    fn finish(mut self) -> Self {
        self.push(LINE_END);
        self
    }
}
