//! Hardware Abstraction Layer
//!
//! Narrow collaborator interfaces used by the power controller. Each
//! peripheral the board touches is reached through one trait here; the
//! STM32L1 implementations live in `drivers` and the recording test doubles
//! in `mock`.

use core::fmt;

pub mod adc;
pub mod gpio;
pub mod pwr;
pub mod radio;
pub mod rcc;
pub mod rtc;
pub mod timer;
pub mod uart;
pub mod watchdog;

pub use adc::{AdcChannel, AdcDriver, AdcResolution};
pub use gpio::{GpioDriver, Level, PinId, PinMode, Port, Pull};
pub use pwr::PowerControl;
pub use radio::RadioFrontEnd;
pub use rcc::{AhbPrescaler, ClockTree, MsiRange, RtcClockSource, SysClkSource, VoltageRange};
pub use rtc::RtcDriver;
pub use timer::{OneShotTimer, TimerFired};
pub use uart::{DataBits, FlowControl, Parity, StopBits, UartConfig, UartDriver, UartFifo};
pub use watchdog::{WatchdogDriver, WatchdogKind};

/// Failure reported by a collaborator driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverError {
    /// Peripheral did not become ready
    NotReady,
    /// Peripheral or its resources are already in use
    Busy,
    /// Configuration rejected by the driver
    InvalidConfig,
    /// Hardware reported a fault
    Hardware,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => f.write_str("not ready"),
            Self::Busy => f.write_str("busy"),
            Self::InvalidConfig => f.write_str("invalid configuration"),
            Self::Hardware => f.write_str("hardware fault"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DriverError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::NotReady => defmt::write!(f, "NotReady"),
            Self::Busy => defmt::write!(f, "Busy"),
            Self::InvalidConfig => defmt::write!(f, "InvalidConfig"),
            Self::Hardware => defmt::write!(f, "Hardware"),
        }
    }
}

/// Peripheral identifiers used in error reports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Peripheral {
    /// GPIO banks
    Gpio,
    /// Diagnostic UART
    Uart,
    /// Real-time clock
    Rtc,
    /// Analog-to-digital converter
    Adc,
    /// Radio SPI bus
    Spi,
    /// Radio front-end I/O
    Radio,
    /// Watchdog
    Watchdog,
}

impl Peripheral {
    /// Short name for logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gpio => "GPIO",
            Self::Uart => "UART",
            Self::Rtc => "RTC",
            Self::Adc => "ADC",
            Self::Spi => "SPI",
            Self::Radio => "RADIO",
            Self::Watchdog => "WDT",
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Peripheral {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str());
    }
}

/// One implementation of every collaborator the board needs
///
/// The board is generic over a `Platform` so the same controller drives the
/// STM32L1 hardware and the host-side mocks.
pub trait Platform {
    /// RCC / PWR / FLASH clock control
    type Clock: ClockTree;
    /// GPIO banks
    type Gpio: GpioDriver;
    /// Battery-sense and potentiometer ADC
    type Adc: AdcDriver;
    /// Diagnostic UART
    type Uart: UartDriver;
    /// SPI bus and radio front-end I/O
    type Radio: RadioFrontEnd;
    /// Real-time clock
    type Rtc: RtcDriver;
    /// One-shot timer used by the calibration
    type Timer: OneShotTimer;
    /// Watchdog
    type Watchdog: WatchdogDriver;
    /// Low-power mode and reset control
    type Power: PowerControl;
}
