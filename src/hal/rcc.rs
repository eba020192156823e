//! Clock Tree Abstractions
//!
//! Low-level RCC, PWR and FLASH steps. The ordering of these steps is
//! owned by `clock::ClockProfileManager`; implementations only perform
//! the individual register writes and report readiness bits.

/// Core voltage scaling range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoltageRange {
    /// 1.8 V, required for 24/32 MHz
    Range1,
    /// 1.5 V
    Range2,
    /// 1.2 V, lowest power
    Range3,
}

/// System clock source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SysClkSource {
    /// Multi-speed internal oscillator
    Msi,
    /// 16 MHz internal oscillator
    Hsi,
    /// External crystal
    Hse,
    /// Phase-locked loop
    Pll,
}

#[cfg(feature = "embedded")]
impl defmt::Format for SysClkSource {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Msi => defmt::write!(f, "MSI"),
            Self::Hsi => defmt::write!(f, "HSI"),
            Self::Hse => defmt::write!(f, "HSE"),
            Self::Pll => defmt::write!(f, "PLL"),
        }
    }
}

/// MSI frequency range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MsiRange {
    /// ~65.5 kHz
    Range0,
}

/// AHB prescaler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AhbPrescaler {
    /// SYSCLK / 1
    Div1,
    /// SYSCLK / 2
    Div2,
}

/// RTC clock source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RtcClockSource {
    /// 32.768 kHz crystal
    Lse,
    /// ~37 kHz internal RC
    Lsi,
}

/// Register-level clock control
pub trait ClockTree {
    /// Enable the PWR interface clock
    fn enable_power_interface(&mut self);

    /// Request a core voltage range
    fn set_voltage_range(&mut self, range: VoltageRange);

    /// Regulator has settled on the requested range
    fn voltage_regulator_ready(&self) -> bool;

    /// Switch the external high-speed oscillator
    fn set_hse(&mut self, on: bool);

    /// HSE is stable
    fn hse_ready(&self) -> bool;

    /// Switch the external 32 kHz oscillator
    fn set_lse(&mut self, on: bool);

    /// LSE is stable
    fn lse_ready(&self) -> bool;

    /// Switch the 16 MHz internal oscillator
    fn set_hsi(&mut self, on: bool);

    /// Switch the low-speed internal oscillator
    fn set_lsi(&mut self, on: bool);

    /// Set flash wait states
    fn set_flash_latency(&mut self, wait_states: u8);

    /// Configure the PLL from HSE; the PLL must be off
    fn configure_pll(&mut self, multiplier: u8, divider: u8);

    /// Switch the PLL
    fn set_pll(&mut self, on: bool);

    /// PLL is locked
    fn pll_ready(&self) -> bool;

    /// Request a system clock source
    fn select_system_clock(&mut self, source: SysClkSource);

    /// Source the system clock currently runs on
    fn system_clock(&self) -> SysClkSource;

    /// Select the MSI range
    fn set_msi_range(&mut self, range: MsiRange);

    /// Set AHB prescaler; APB1/APB2 are always /1
    fn set_bus_prescalers(&mut self, ahb: AhbPrescaler);

    /// Route the RTC clock
    fn select_rtc_clock(&mut self, source: RtcClockSource);
}
