//! ADC Abstractions
//!
//! Single-conversion access to the battery-sense (VREFINT) and
//! potentiometer channels.

use super::DriverError;

/// ADC input channel number
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdcChannel(u8);

impl AdcChannel {
    /// Internal bandgap reference
    pub const VREFINT: Self = Self(crate::config::adc_channels::VREFINT);

    /// Potentiometer / analog alarm input
    pub const POTI: Self = Self(crate::config::adc_channels::POTI);

    /// Wrap a channel number
    #[must_use]
    pub const fn new(channel: u8) -> Self {
        Self(channel)
    }

    /// Channel number
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for AdcChannel {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "CH{}", self.0);
    }
}

/// Conversion resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AdcResolution {
    /// 12-bit, full scale 4095
    #[default]
    Bits12,
    /// 10-bit, full scale 1023
    Bits10,
}

impl AdcResolution {
    /// Largest code at this resolution
    #[must_use]
    pub const fn full_scale(self) -> u16 {
        match self {
            Self::Bits12 => crate::config::ADC_MAX_VALUE_12BIT,
            Self::Bits10 => crate::config::ADC_MAX_VALUE_10BIT,
        }
    }
}

/// Analog-to-digital converter
pub trait AdcDriver {
    /// Power up and calibrate the converter
    ///
    /// # Errors
    ///
    /// Returns an error if the converter does not become ready.
    fn init(&mut self) -> Result<(), DriverError>;

    /// Power the converter down
    fn deinit(&mut self);

    /// Blocking single conversion
    fn read_channel(&mut self, channel: AdcChannel, resolution: AdcResolution) -> u16;
}
