//! GPIO Abstractions
//!
//! Pin identifiers and electrical modes for the board's GPIO banks.
//! Pins are named by port and index so the pin map in `config::pins`
//! can be written as plain constants.

use super::DriverError;

/// GPIO port letter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Port {
    /// Port A
    A,
    /// Port B
    B,
    /// Port C
    C,
    /// Port H (oscillator pins)
    H,
}

impl Port {
    /// Port letter for logs
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::H => 'H',
        }
    }
}

/// A single pin: port plus index 0..=15
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PinId {
    port: Port,
    index: u8,
}

impl PinId {
    /// Create a pin identifier, the index is masked to 0..=15
    #[must_use]
    pub const fn new(port: Port, index: u8) -> Self {
        Self {
            port,
            index: index & 0x0F,
        }
    }

    /// Port of this pin
    #[must_use]
    pub const fn port(self) -> Port {
        self.port
    }

    /// Index within the port
    #[must_use]
    pub const fn index(self) -> u8 {
        self.index
    }
}

impl core::fmt::Display for PinId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "P{}{}", self.port.letter(), self.index)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PinId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "P{}{}", self.port.letter(), self.index);
    }
}

/// Pin mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PinMode {
    /// Digital input
    Input,
    /// Push-pull output
    Output,
    /// Analog / high impedance, lowest leakage
    #[default]
    Analog,
}

#[cfg(feature = "embedded")]
impl defmt::Format for PinMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Input => defmt::write!(f, "IN"),
            Self::Output => defmt::write!(f, "OUT"),
            Self::Analog => defmt::write!(f, "ANALOG"),
        }
    }
}

/// Internal pull resistor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Pull {
    /// Floating
    #[default]
    None,
    /// Pull-up
    Up,
    /// Pull-down
    Down,
}

/// Output level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Level {
    /// Driven low
    #[default]
    Low,
    /// Driven high
    High,
}

/// GPIO bank access
pub trait GpioDriver {
    /// Configure one pin; `initial` is the output level for `PinMode::Output`
    /// and ignored otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin cannot be configured.
    fn configure_pin(
        &mut self,
        pin: PinId,
        mode: PinMode,
        pull: Pull,
        initial: Level,
    ) -> Result<(), DriverError>;

    /// Drive an output pin
    fn write_pin(&mut self, pin: PinId, level: Level);
}
