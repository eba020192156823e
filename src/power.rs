//! Power Management
//!
//! Battery voltage estimation, level mapping, potentiometer scaling and the
//! low-power mode policy. Everything here is pure so it can be tested on the
//! host without a board.

use crate::config::{
    ADC_VREF_BANDGAP_MV, BATTERY_MAX_LEVEL_MV, BATTERY_MIN_LEVEL_MV, BATTERY_SHUTDOWN_LEVEL_MV,
    POTI_MAX_LEVEL, POTI_MIN_LEVEL,
};
use crate::types::{BatteryLevel, Millivolts, PowerSource};

/// Convert a VREFINT conversion into the supply voltage
///
/// The bandgap reference sits at a fixed 1224 mV, so the supply is
/// `1224 * full_scale / raw`. A raw code of 0 is treated as 1.
#[must_use]
pub fn battery_millivolts(raw: u16, full_scale: u16) -> Millivolts {
    let raw = u32::from(raw.max(1));
    Millivolts::from_mv(ADC_VREF_BANDGAP_MV * u32::from(full_scale) / raw)
}

/// Map a supply voltage onto a [`BatteryLevel`] code
///
/// | Condition              | Code                          |
/// |------------------------|-------------------------------|
/// | USB powered            | 0                             |
/// | v >= 3000 mV           | 254                           |
/// | 2400 < v < 3000 mV     | `1 + 253 * (v - 2400) / 600`  |
/// | 2300 < v <= 2400 mV    | 1                             |
/// | v <= 2300 mV           | 255                           |
#[must_use]
pub fn battery_level(source: PowerSource, voltage: Millivolts) -> BatteryLevel {
    if source == PowerSource::Usb {
        return BatteryLevel::EXTERNAL_POWER;
    }

    let mv = voltage.as_mv();
    if mv >= BATTERY_MAX_LEVEL_MV {
        BatteryLevel::FULL
    } else if mv > BATTERY_MIN_LEVEL_MV {
        let span = BATTERY_MAX_LEVEL_MV - BATTERY_MIN_LEVEL_MV;
        let scaled = 253 * (mv - BATTERY_MIN_LEVEL_MV) / span;
        // scaled < 253 here, the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        let code = scaled as u8 + 1;
        BatteryLevel::from_code(code)
    } else if mv > BATTERY_SHUTDOWN_LEVEL_MV {
        BatteryLevel::CRITICAL
    } else {
        BatteryLevel::SHUTDOWN
    }
}

/// Potentiometer sample
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PotiLevel {
    /// Raw ADC code (0 when the analog alarm is not armed)
    pub raw: u16,
    /// Position in percent, 0..=100
    pub percent: u8,
}

#[cfg(feature = "embedded")]
impl defmt::Format for PotiLevel {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Poti({}, {}%)", self.raw, self.percent);
    }
}

/// Scale a raw potentiometer code
///
/// Codes at or above 900 read 100%, at or below 10 read 0%, and anything
/// between maps to `(raw - 10) * 100 / 900`.
#[must_use]
pub fn potentiometer_level(raw: u16) -> PotiLevel {
    let percent = if raw >= POTI_MAX_LEVEL {
        100
    } else if raw <= POTI_MIN_LEVEL {
        0
    } else {
        let pct = u32::from(raw - POTI_MIN_LEVEL) * 100 / u32::from(POTI_MAX_LEVEL);
        // raw < 900, so pct < 100
        #[allow(clippy::cast_possible_truncation)]
        let percent = pct as u8;
        percent
    };

    PotiLevel { raw, percent }
}

/// Low-power modes the idle hook can choose from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LowPowerMode {
    /// Core halted, clocks running
    #[default]
    Sleep,
    /// Clocks stopped, RAM retained
    Stop,
    /// Standby; never used on this board
    Off,
}

#[cfg(feature = "embedded")]
impl defmt::Format for LowPowerMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Sleep => defmt::write!(f, "SLEEP"),
            Self::Stop => defmt::write!(f, "STOP"),
            Self::Off => defmt::write!(f, "OFF"),
        }
    }
}

/// Which low-power modes are currently permitted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LowPowerPolicy {
    stop_allowed: bool,
    off_allowed: bool,
}

impl LowPowerPolicy {
    /// Policy before the board is initialized: Sleep only
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stop_allowed: false,
            off_allowed: false,
        }
    }

    /// Policy for a power source: Stop on battery, never Off
    ///
    /// On USB the host keeps the node powered and must be able to talk to
    /// the UART, so Stop is disabled.
    #[must_use]
    pub const fn for_source(source: PowerSource) -> Self {
        Self {
            stop_allowed: matches!(source, PowerSource::Battery),
            off_allowed: false,
        }
    }

    /// Stop mode permitted
    #[must_use]
    pub const fn stop_allowed(&self) -> bool {
        self.stop_allowed
    }

    /// Off mode permitted
    #[must_use]
    pub const fn off_allowed(&self) -> bool {
        self.off_allowed
    }

    /// Deepest permitted mode, never deeper than Stop
    #[must_use]
    pub const fn deepest(&self) -> LowPowerMode {
        if self.stop_allowed {
            LowPowerMode::Stop
        } else {
            LowPowerMode::Sleep
        }
    }
}

impl Default for LowPowerPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LowPowerPolicy {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "LowPowerPolicy(stop={}, off={})", self.stop_allowed, self.off_allowed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_raw_does_not_divide_by_zero() {
        assert_eq!(battery_millivolts(0, 4095).as_mv(), 1224 * 4095);
    }

    #[test]
    fn level_boundaries() {
        let bat = PowerSource::Battery;
        assert_eq!(battery_level(bat, Millivolts::from_mv(3000)), BatteryLevel::FULL);
        assert_eq!(battery_level(bat, Millivolts::from_mv(2400)), BatteryLevel::CRITICAL);
        assert_eq!(battery_level(bat, Millivolts::from_mv(2300)), BatteryLevel::SHUTDOWN);
        assert_eq!(battery_level(bat, Millivolts::from_mv(2401)).code(), 1);
        assert_eq!(battery_level(bat, Millivolts::from_mv(2999)).code(), 253);
    }

    #[test]
    fn poti_midpoint() {
        assert_eq!(potentiometer_level(460).percent, 50);
    }
}
