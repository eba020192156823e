//! RCC / PWR / FLASH register access

use embassy_stm32::pac;
use embassy_stm32::pac::pwr::vals::Vos;
use embassy_stm32::pac::rcc::vals::{Hpre, Msirange, Plldiv, Pllmul, Pllsrc, Ppre, Rtcsel, Sw};

use crate::hal::rcc::{AhbPrescaler, ClockTree, MsiRange, RtcClockSource, SysClkSource, VoltageRange};

/// Register-level clock tree
#[derive(Debug, Default)]
pub struct Stm32ClockTree {
    _private: (),
}

impl Stm32ClockTree {
    /// Clock tree handle
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

const fn pllmul(multiplier: u8) -> Pllmul {
    match multiplier {
        3 => Pllmul::MUL3,
        4 => Pllmul::MUL4,
        8 => Pllmul::MUL8,
        12 => Pllmul::MUL12,
        16 => Pllmul::MUL16,
        24 => Pllmul::MUL24,
        32 => Pllmul::MUL32,
        48 => Pllmul::MUL48,
        _ => Pllmul::MUL6,
    }
}

const fn plldiv(divider: u8) -> Plldiv {
    match divider {
        2 => Plldiv::DIV2,
        4 => Plldiv::DIV4,
        _ => Plldiv::DIV3,
    }
}

impl ClockTree for Stm32ClockTree {
    fn enable_power_interface(&mut self) {
        pac::RCC.apb1enr().modify(|w| w.set_pwren(true));
    }

    fn set_voltage_range(&mut self, range: VoltageRange) {
        let vos = match range {
            VoltageRange::Range1 => Vos::RANGE1,
            VoltageRange::Range2 => Vos::RANGE2,
            VoltageRange::Range3 => Vos::RANGE3,
        };
        pac::PWR.cr().modify(|w| w.set_vos(vos));
    }

    fn voltage_regulator_ready(&self) -> bool {
        !pac::PWR.csr().read().vosf()
    }

    fn set_hse(&mut self, on: bool) {
        pac::RCC.cr().modify(|w| w.set_hseon(on));
    }

    fn hse_ready(&self) -> bool {
        pac::RCC.cr().read().hserdy()
    }

    fn set_lse(&mut self, on: bool) {
        // LSE lives in the backup domain
        pac::PWR.cr().modify(|w| w.set_dbp(true));
        pac::RCC.csr().modify(|w| w.set_lseon(on));
    }

    fn lse_ready(&self) -> bool {
        pac::RCC.csr().read().lserdy()
    }

    fn set_hsi(&mut self, on: bool) {
        pac::RCC.cr().modify(|w| w.set_hsion(on));
    }

    fn set_lsi(&mut self, on: bool) {
        pac::RCC.csr().modify(|w| w.set_lsion(on));
    }

    fn set_flash_latency(&mut self, wait_states: u8) {
        let one = wait_states > 0;
        if one {
            // 64-bit access must be on before the latency is raised
            pac::FLASH.acr().modify(|w| w.set_acc64(true));
            pac::FLASH.acr().modify(|w| {
                w.set_prften(true);
                w.set_latency(true);
            });
        } else {
            pac::FLASH.acr().modify(|w| {
                w.set_latency(false);
                w.set_prften(false);
            });
            pac::FLASH.acr().modify(|w| w.set_acc64(false));
        }
    }

    fn configure_pll(&mut self, multiplier: u8, divider: u8) {
        pac::RCC.cfgr().modify(|w| {
            w.set_pllsrc(Pllsrc::HSE);
            w.set_pllmul(pllmul(multiplier));
            w.set_plldiv(plldiv(divider));
        });
    }

    fn set_pll(&mut self, on: bool) {
        pac::RCC.cr().modify(|w| w.set_pllon(on));
    }

    fn pll_ready(&self) -> bool {
        pac::RCC.cr().read().pllrdy()
    }

    fn select_system_clock(&mut self, source: SysClkSource) {
        let sw = match source {
            SysClkSource::Msi => Sw::MSI,
            SysClkSource::Hsi => Sw::HSI,
            SysClkSource::Hse => Sw::HSE,
            SysClkSource::Pll => Sw::PLL1_R,
        };
        pac::RCC.cfgr().modify(|w| w.set_sw(sw));
    }

    fn system_clock(&self) -> SysClkSource {
        match pac::RCC.cfgr().read().sws() {
            Sw::HSI => SysClkSource::Hsi,
            Sw::HSE => SysClkSource::Hse,
            Sw::PLL1_R => SysClkSource::Pll,
            _ => SysClkSource::Msi,
        }
    }

    fn set_msi_range(&mut self, range: MsiRange) {
        let msirange = match range {
            MsiRange::Range0 => Msirange::RANGE66K,
        };
        pac::RCC.icscr().modify(|w| w.set_msirange(msirange));
    }

    fn set_bus_prescalers(&mut self, ahb: AhbPrescaler) {
        let hpre = match ahb {
            AhbPrescaler::Div1 => Hpre::DIV1,
            AhbPrescaler::Div2 => Hpre::DIV2,
        };
        pac::RCC.cfgr().modify(|w| {
            w.set_hpre(hpre);
            w.set_ppre1(Ppre::DIV1);
            w.set_ppre2(Ppre::DIV1);
        });
    }

    fn select_rtc_clock(&mut self, source: RtcClockSource) {
        let rtcsel = match source {
            RtcClockSource::Lse => Rtcsel::LSE,
            RtcClockSource::Lsi => Rtcsel::LSI,
        };
        pac::PWR.cr().modify(|w| w.set_dbp(true));
        pac::RCC.csr().modify(|w| {
            w.set_rtcsel(rtcsel);
            w.set_rtcen(true);
        });
    }
}
