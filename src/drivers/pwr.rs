//! Low-power mode entry and reset

use cortex_m::peripheral::SCB;
use embassy_stm32::pac;
use embassy_stm32::pac::pwr::vals::Pdds;

use crate::hal::PowerControl;

/// PWR block and the core's sleep controls
#[derive(Debug, Default)]
pub struct Stm32Power {
    _private: (),
}

impl Stm32Power {
    /// Power control handle
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

fn scb() -> SCB {
    // SAFETY: only SCR sleep bits are modified, always from thread mode
    unsafe { cortex_m::Peripherals::steal() }.SCB
}

impl PowerControl for Stm32Power {
    fn disable_pvd(&mut self) {
        pac::PWR.cr().modify(|w| w.set_pvde(false));
    }

    fn clear_wakeup_flag(&mut self) {
        pac::PWR.cr().modify(|w| w.set_cwuf(true));
    }

    fn enable_ultra_low_power(&mut self) {
        pac::PWR.cr().modify(|w| w.set_ulp(true));
    }

    fn enable_fast_wakeup(&mut self) {
        pac::PWR.cr().modify(|w| w.set_fwu(true));
    }

    fn set_debug_in_low_power(&mut self, enabled: bool) {
        pac::DBGMCU.cr().modify(|w| {
            w.set_dbg_sleep(enabled);
            w.set_dbg_stop(enabled);
            w.set_dbg_standby(enabled);
        });
    }

    fn wait_for_interrupt_sleep(&mut self) {
        scb().clear_sleepdeep();
        cortex_m::asm::wfi();
    }

    fn wait_for_interrupt_stop(&mut self) {
        pac::PWR.cr().modify(|w| {
            w.set_pdds(Pdds::STOP_MODE);
            w.set_lpsdsr(true);
        });

        let mut scb = scb();
        scb.set_sleepdeep();
        cortex_m::asm::wfi();
        scb.clear_sleepdeep();
    }

    fn system_reset(&mut self) -> ! {
        cortex_m::interrupt::disable();
        SCB::sys_reset()
    }
}
