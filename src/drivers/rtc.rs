//! RTC access and wakeup latency measurement
//!
//! The latency is the time the calendar shadow registers need to resync
//! after the clock tree is restored, measured with the DWT cycle counter.

use cortex_m::peripheral::{DWT, NVIC};
use embassy_stm32::pac;
use embassy_stm32::pac::interrupt;
use embassy_stm32::pac::rtc::vals::{Fmt, Wucksel};

use crate::config::SYSTEM_CLOCK_HZ;
use crate::hal::{DriverError, RtcDriver};
use crate::types::WakeupLatency;

/// Polls of the init-mode flag before giving up
const INIT_POLLS: u32 = 100_000;

/// EXTI line wired to the RTC wakeup timer
const WAKEUP_EXTI_LINE: usize = 20;

/// RTC clocked from LSE
#[derive(Debug, Default)]
pub struct Stm32Rtc {
    latency: WakeupLatency,
}

impl Stm32Rtc {
    /// RTC handle; the calendar is started in `init`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latency: WakeupLatency::ZERO,
        }
    }
}

fn unlock() {
    pac::PWR.cr().modify(|w| w.set_dbp(true));
    pac::RTC.wpr().write(|w| w.set_key(0xCA));
    pac::RTC.wpr().write(|w| w.set_key(0x53));
}

fn lock() {
    pac::RTC.wpr().write(|w| w.set_key(0xFF));
}

impl Stm32Rtc {
    /// Wake the core from Stop every `seconds` (at least 1)
    pub fn start_periodic_wakeup(&mut self, seconds: u16) {
        unlock();
        pac::RTC.cr().modify(|w| {
            w.set_wute(false);
            w.set_wutie(false);
        });
        while !pac::RTC.isr().read().wutwf() {}
        pac::RTC.wutr().write(|w| w.set_wut(seconds.max(1) - 1));
        pac::RTC.cr().modify(|w| {
            w.set_wucksel(Wucksel::CLOCK_SPARE);
            w.set_wute(true);
            w.set_wutie(true);
        });
        lock();

        pac::EXTI.rtsr(0).modify(|w| w.set_line(WAKEUP_EXTI_LINE, true));
        pac::EXTI.imr(0).modify(|w| w.set_line(WAKEUP_EXTI_LINE, true));
        // SAFETY: the handler below only clears flags
        unsafe { NVIC::unmask(pac::Interrupt::RTC_WKUP) };
    }
}

#[interrupt]
fn RTC_WKUP() {
    unlock();
    pac::RTC.isr().modify(|w| w.set_wutf(false));
    lock();
    pac::EXTI.pr(0).write(|w| w.set_line(WAKEUP_EXTI_LINE, true));
}

impl RtcDriver for Stm32Rtc {
    fn init(&mut self) -> Result<(), DriverError> {
        unlock();
        pac::RTC.isr().modify(|w| w.set_init(true));
        let ready = (0..INIT_POLLS).any(|_| pac::RTC.isr().read().initf());
        if ready {
            // 32768 Hz / (127 + 1) / (255 + 1) = 1 Hz
            pac::RTC.prer().modify(|w| {
                w.set_prediv_a(127);
                w.set_prediv_s(255);
            });
            pac::RTC.cr().modify(|w| w.set_fmt(Fmt::TWENTY_FOUR_HOUR));
        }
        pac::RTC.isr().modify(|w| w.set_init(false));
        lock();

        if ready {
            Ok(())
        } else {
            Err(DriverError::NotReady)
        }
    }

    fn measure_wakeup_latency(&mut self) -> WakeupLatency {
        // SAFETY: only the trace enable bits are touched
        let mut core = unsafe { cortex_m::Peripherals::steal() };
        core.DCB.enable_trace();
        core.DWT.enable_cycle_counter();

        unlock();
        pac::RTC.isr().modify(|w| w.set_rsf(false));
        lock();

        let start = DWT::cycle_count();
        while !pac::RTC.isr().read().rsf() {}
        let cycles = DWT::cycle_count().wrapping_sub(start);

        let cycles_per_ms = SYSTEM_CLOCK_HZ / 1000;
        WakeupLatency::from_millis(cycles.div_ceil(cycles_per_ms))
    }

    fn record_wakeup_latency(&mut self, latency: WakeupLatency) {
        self.latency = latency;
    }

    fn wakeup_latency(&self) -> WakeupLatency {
        self.latency
    }
}
