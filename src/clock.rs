//! Clock Profile Manager
//!
//! Applies one of two oscillator / PLL configurations:
//!
//! - **FullSpeed**: HSE (12 MHz) through the PLL (x6 / 3) for a 24 MHz
//!   system clock at voltage range 1. Required whenever any peripheral other
//!   than the RTC is running.
//! - **LowPower**: MSI range 0 at voltage range 3 with HSE, HSI, PLL and LSI
//!   switched off. SYSCLK moves to MSI before the flash wait state and the
//!   core voltage are lowered.
//!
//! The first FullSpeed application takes the cold path (LSE start, flash
//! latency, prescalers, RTC clock routing). Every later one, including the
//! one taken after each wake from Stop, only restores HSE and the PLL.

use core::fmt;

use crate::config::{
    FULL_SPEED_FLASH_LATENCY, HSE_STARTUP_POLLS, LSE_STARTUP_POLLS, PLL_DIVIDER, PLL_LOCK_POLLS,
    PLL_MULTIPLIER,
};
use crate::hal::rcc::{AhbPrescaler, ClockTree, MsiRange, RtcClockSource, SysClkSource, VoltageRange};
use crate::types::ClockProfile;

/// Clock configuration failure; always fatal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockError {
    /// HSE did not become ready
    OscillatorTimeout,
    /// LSE did not become ready
    LseTimeout,
    /// PLL did not lock
    PllTimeout,
    /// System clock did not switch to the PLL
    SwitchTimeout,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OscillatorTimeout => f.write_str("HSE startup timeout"),
            Self::LseTimeout => f.write_str("LSE startup timeout"),
            Self::PllTimeout => f.write_str("PLL lock timeout"),
            Self::SwitchTimeout => f.write_str("system clock switch timeout"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ClockError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::OscillatorTimeout => defmt::write!(f, "OscillatorTimeout"),
            Self::LseTimeout => defmt::write!(f, "LseTimeout"),
            Self::PllTimeout => defmt::write!(f, "PllTimeout"),
            Self::SwitchTimeout => defmt::write!(f, "SwitchTimeout"),
        }
    }
}

/// Poll `ready` at most `polls` times
fn wait_until(polls: u32, mut ready: impl FnMut() -> bool) -> bool {
    for _ in 0..polls {
        if ready() {
            return true;
        }
        core::hint::spin_loop();
    }
    false
}

/// Poll `ready` until it holds
fn wait_forever(mut ready: impl FnMut() -> bool) {
    while !ready() {
        core::hint::spin_loop();
    }
}

/// Owns the clock tree and remembers which profile is applied
#[derive(Debug)]
pub struct ClockProfileManager<C> {
    tree: C,
    current: Option<ClockProfile>,
    cold_done: bool,
}

impl<C: ClockTree> ClockProfileManager<C> {
    /// Wrap a clock tree; no profile is applied yet
    #[must_use]
    pub const fn new(tree: C) -> Self {
        Self {
            tree,
            current: None,
            cold_done: false,
        }
    }

    /// Apply a clock profile
    ///
    /// # Errors
    ///
    /// Returns a [`ClockError`] when an oscillator, the PLL or the clock
    /// switch does not become ready within its poll bound. The clock tree is
    /// then in an unknown state and the caller must halt or reset.
    pub fn apply_profile(&mut self, profile: ClockProfile) -> Result<(), ClockError> {
        match profile {
            ClockProfile::FullSpeed if self.cold_done => self.full_speed_reconfigure()?,
            ClockProfile::FullSpeed => {
                self.full_speed_cold()?;
                self.cold_done = true;
            }
            ClockProfile::LowPower => self.low_power(),
        }

        self.current = Some(profile);
        debug!("clock: {} applied", profile);
        Ok(())
    }

    fn full_speed_cold(&mut self) -> Result<(), ClockError> {
        self.tree.enable_power_interface();
        self.tree.set_voltage_range(VoltageRange::Range1);
        wait_forever(|| self.tree.voltage_regulator_ready());

        self.tree.set_hse(true);
        self.tree.set_lse(true);
        if !wait_until(HSE_STARTUP_POLLS, || self.tree.hse_ready()) {
            return Err(ClockError::OscillatorTimeout);
        }
        if !wait_until(LSE_STARTUP_POLLS, || self.tree.lse_ready()) {
            return Err(ClockError::LseTimeout);
        }

        self.tree.set_flash_latency(FULL_SPEED_FLASH_LATENCY);
        self.start_pll()?;

        self.tree.set_bus_prescalers(AhbPrescaler::Div1);
        self.tree.select_rtc_clock(RtcClockSource::Lse);
        Ok(())
    }

    fn full_speed_reconfigure(&mut self) -> Result<(), ClockError> {
        self.tree.enable_power_interface();
        self.tree.set_voltage_range(VoltageRange::Range1);
        wait_forever(|| self.tree.voltage_regulator_ready());

        self.tree.set_hse(true);
        if !wait_until(HSE_STARTUP_POLLS, || self.tree.hse_ready()) {
            return Err(ClockError::OscillatorTimeout);
        }
        self.start_pll()
    }

    fn start_pll(&mut self) -> Result<(), ClockError> {
        // PLL cannot be reconfigured while it drives SYSCLK
        if self.tree.system_clock() == SysClkSource::Pll && self.tree.pll_ready() {
            trace!("clock: PLL already driving SYSCLK");
            return Ok(());
        }

        self.tree.configure_pll(PLL_MULTIPLIER, PLL_DIVIDER);
        self.tree.set_pll(true);
        if !wait_until(PLL_LOCK_POLLS, || self.tree.pll_ready()) {
            return Err(ClockError::PllTimeout);
        }

        self.tree.select_system_clock(SysClkSource::Pll);
        if !wait_until(PLL_LOCK_POLLS, || self.tree.system_clock() == SysClkSource::Pll) {
            return Err(ClockError::SwitchTimeout);
        }
        Ok(())
    }

    fn low_power(&mut self) {
        // Leave the PLL before wait states and core voltage drop
        self.tree.set_msi_range(MsiRange::Range0);
        self.tree.select_system_clock(SysClkSource::Msi);
        wait_forever(|| self.tree.system_clock() == SysClkSource::Msi);

        self.tree.set_flash_latency(0);
        self.tree.enable_power_interface();
        self.tree.set_voltage_range(VoltageRange::Range3);
        wait_forever(|| self.tree.voltage_regulator_ready());

        self.tree.set_bus_prescalers(AhbPrescaler::Div2);
        self.tree.set_hsi(false);
        self.tree.set_pll(false);
        self.tree.set_hse(false);
        self.tree.set_lsi(false);
    }

    /// The core resumed from Stop; hardware has fallen back to MSI
    pub fn note_stop_wakeup(&mut self) {
        if self.current.is_some() {
            self.current = Some(ClockProfile::LowPower);
        }
    }

    /// HSE ready bit
    #[must_use]
    pub fn is_hse_ready(&self) -> bool {
        self.tree.hse_ready()
    }

    /// PLL lock bit
    #[must_use]
    pub fn is_pll_ready(&self) -> bool {
        self.tree.pll_ready()
    }

    /// Is `profile` the one last applied
    #[must_use]
    pub fn is_running_on(&self, profile: ClockProfile) -> bool {
        self.current == Some(profile)
    }

    /// Profile last applied, `None` before the first application
    #[must_use]
    pub const fn current(&self) -> Option<ClockProfile> {
        self.current
    }

    /// Borrow the underlying clock tree
    #[must_use]
    pub const fn tree(&self) -> &C {
        &self.tree
    }
}
