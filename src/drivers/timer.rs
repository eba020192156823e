//! One-shot millisecond timer on SysTick
//!
//! The embassy time driver runs on TIM3, leaving SysTick free. The timer
//! reloads every millisecond and raises the armed flag when the countdown
//! reaches zero, then stops itself.

use core::cell::Cell;

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::exception;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::SYSTEM_CLOCK_HZ;
use crate::hal::{OneShotTimer, TimerFired};

/// Pending flag and remaining milliseconds
static ARMED: Mutex<CriticalSectionRawMutex, Cell<Option<(&'static TimerFired, u32)>>> =
    Mutex::new(Cell::new(None));

/// SysTick one-shot
#[derive(Debug, Default)]
pub struct SysTickTimer {
    _private: (),
}

impl SysTickTimer {
    /// Timer handle
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl OneShotTimer for SysTickTimer {
    fn arm(&mut self, duration_ms: u32, fired: &'static TimerFired) {
        if duration_ms == 0 {
            fired.signal();
            return;
        }

        ARMED.lock(|slot| slot.set(Some((fired, duration_ms))));

        // SAFETY: SysTick is owned by this driver
        let mut syst = unsafe { cortex_m::Peripherals::steal() }.SYST;
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(SYSTEM_CLOCK_HZ / 1000 - 1);
        syst.clear_current();
        syst.enable_interrupt();
        syst.enable_counter();
    }
}

#[exception]
fn SysTick() {
    let expired = ARMED.lock(|slot| match slot.get() {
        Some((fired, 1)) => {
            slot.set(None);
            fired.signal();
            true
        }
        Some((fired, remaining)) => {
            slot.set(Some((fired, remaining - 1)));
            false
        }
        None => true,
    });

    if expired {
        // SAFETY: SysTick is owned by this driver
        let mut syst = unsafe { cortex_m::Peripherals::steal() }.SYST;
        syst.disable_interrupt();
        syst.disable_counter();
    }
}
