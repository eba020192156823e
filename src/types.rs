//! Shared types used across the node firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

/// Board lifecycle state owned by the power mode controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BoardState {
    /// Cold boot, nothing configured yet
    #[default]
    Uninitialized,
    /// Clocks at full speed, all peripherals running
    Active,
    /// Core halted in sleep, waiting for any interrupt
    Sleeping,
    /// Core halted in stop, peripherals de-initialized
    Stopped,
}

impl BoardState {
    /// Short name for logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINIT",
            Self::Active => "ACTIVE",
            Self::Sleeping => "SLEEP",
            Self::Stopped => "STOP",
        }
    }

    /// True once the first full initialization has completed
    #[must_use]
    pub const fn is_initialized(self) -> bool {
        !matches!(self, Self::Uninitialized)
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BoardState {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str());
    }
}

/// Oscillator / PLL configuration currently driving the system clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockProfile {
    /// External oscillator + PLL, voltage range 1
    FullSpeed,
    /// MSI without PLL, voltage range 3, external oscillator off
    LowPower,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ClockProfile {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::FullSpeed => defmt::write!(f, "FullSpeed"),
            Self::LowPower => defmt::write!(f, "LowPower"),
        }
    }
}

/// Where the board draws its power from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PowerSource {
    /// Running on battery
    #[default]
    Battery,
    /// External USB power
    Usb,
}

#[cfg(feature = "embedded")]
impl defmt::Format for PowerSource {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Battery => defmt::write!(f, "BAT"),
            Self::Usb => defmt::write!(f, "USB"),
        }
    }
}

/// Progress of the one-shot wakeup latency calibration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CalibrationState {
    /// Never started
    #[default]
    NotStarted,
    /// Timer armed, waiting for it to fire
    InProgress,
    /// Latency recorded; never leaves this state
    Done,
}

#[cfg(feature = "embedded")]
impl defmt::Format for CalibrationState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::NotStarted => defmt::write!(f, "NotStarted"),
            Self::InProgress => defmt::write!(f, "InProgress"),
            Self::Done => defmt::write!(f, "Done"),
        }
    }
}

/// Voltage in millivolts
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Millivolts(u32);

impl Millivolts {
    /// Create from a millivolt value
    #[must_use]
    pub const fn from_mv(mv: u32) -> Self {
        Self(mv)
    }

    /// Get the value in millivolts
    #[must_use]
    pub const fn as_mv(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Millivolts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mV", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Millivolts {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}mV", self.0);
    }
}

/// Normalized battery level code
///
/// Codes 1..=254 grow with the remaining charge. Three codes are reserved:
/// 0 reports external power, 255 reports a battery below the shutdown
/// threshold, and 254 is used for any voltage at or above full charge.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatteryLevel(u8);

impl BatteryLevel {
    /// Board is externally powered
    pub const EXTERNAL_POWER: Self = Self(0);

    /// Critically low but still running
    pub const CRITICAL: Self = Self(1);

    /// Fully charged
    pub const FULL: Self = Self(254);

    /// Below the shutdown threshold
    pub const SHUTDOWN: Self = Self(255);

    /// Wrap a raw level code
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        Self(code)
    }

    /// Raw level code (0..=255)
    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Level reports external power
    #[must_use]
    pub const fn is_external_power(self) -> bool {
        self.0 == Self::EXTERNAL_POWER.0
    }

    /// Level reports a battery below the shutdown threshold
    #[must_use]
    pub const fn is_shutdown(self) -> bool {
        self.0 == Self::SHUTDOWN.0
    }
}

impl fmt::Debug for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BatteryLevel({})", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BatteryLevel {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "BatteryLevel({})", self.0);
    }
}

/// Delay between a stop-mode wake event and stable RTC timekeeping
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct WakeupLatency(u32);

impl WakeupLatency {
    /// No latency recorded
    pub const ZERO: Self = Self(0);

    /// Create from milliseconds
    #[must_use]
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    /// Get the latency in milliseconds
    #[must_use]
    pub const fn as_millis(self) -> u32 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for WakeupLatency {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}ms", self.0);
    }
}

/// 8-byte device identifier, index 0 is the least significant byte
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniqueId(pub [u8; 8]);

impl UniqueId {
    /// Identifier bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for UniqueId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[u8]:02X}", self.0);
    }
}

/// The three factory-programmed identifier words of the MCU
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DeviceIdWords {
    /// First word
    pub a: u32,
    /// Second word
    pub b: u32,
    /// Third word
    pub c: u32,
}

impl DeviceIdWords {
    /// Bundle three identifier words
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    /// Random seed: `a ^ b ^ c`
    #[must_use]
    pub const fn random_seed(&self) -> u32 {
        self.a ^ self.b ^ self.c
    }

    /// Unique identifier
    ///
    /// Bytes 7..4 hold `a + c` (wrapping) most significant byte first,
    /// bytes 3..0 hold `b` most significant byte first.
    #[must_use]
    pub const fn unique_id(&self) -> UniqueId {
        let hi = self.a.wrapping_add(self.c).to_be_bytes();
        let lo = self.b.to_be_bytes();
        UniqueId([lo[3], lo[2], lo[1], lo[0], hi[3], hi[2], hi[1], hi[0]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_xor_of_words() {
        let ids = DeviceIdWords::new(0x1111_1111, 0x2222_2222, 0x3333_3333);
        assert_eq!(ids.random_seed(), 0x1111_1111 ^ 0x2222_2222 ^ 0x3333_3333);
    }

    #[test]
    fn unique_id_of_repeating_words() {
        let ids = DeviceIdWords::new(0x1111_1111, 0x2222_2222, 0x3333_3333);
        assert_eq!(
            ids.unique_id().0,
            [0x22, 0x22, 0x22, 0x22, 0x44, 0x44, 0x44, 0x44]
        );
    }

    #[test]
    fn unique_id_byte_order() {
        let ids = DeviceIdWords::new(0x0102_0304, 0xA0B0_C0D0, 0x1000_0000);
        // a + c = 0x1102_0304
        assert_eq!(
            ids.unique_id().0,
            [0xD0, 0xC0, 0xB0, 0xA0, 0x04, 0x03, 0x02, 0x11]
        );
    }

    #[test]
    fn unique_id_sum_wraps() {
        let ids = DeviceIdWords::new(0xFFFF_FFFF, 0, 0x0000_0002);
        assert_eq!(ids.unique_id().0[4..], [0x01, 0x00, 0x00, 0x00]);
    }
}
