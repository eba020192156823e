//! Wakeup Calibrator
//!
//! Measures, once per boot and only on battery power, how long the RTC
//! needs to become usable after a wake from Stop. The result is stored in
//! the RTC driver, which uses it to schedule alarms slightly early.
//!
//! The measurement waits on a one-shot timer. The timer interrupt only
//! raises a [`TimerFired`] flag; the RTC is read and written back here, in
//! thread context, once the flag is observed.

use crate::config::CALIBRATION_INTERVAL_MS;
use crate::hal::{OneShotTimer, RtcDriver, TimerFired};
use crate::types::{CalibrationState, PowerSource, WakeupLatency};

/// One-shot wakeup latency calibration
#[derive(Debug)]
pub struct WakeupCalibrator {
    state: CalibrationState,
    fired: &'static TimerFired,
}

impl WakeupCalibrator {
    /// New calibrator signaled through `fired`
    #[must_use]
    pub const fn new(fired: &'static TimerFired) -> Self {
        Self {
            state: CalibrationState::NotStarted,
            fired,
        }
    }

    /// Run the calibration if it is still needed
    ///
    /// Returns immediately when not on battery or when a latency has already
    /// been recorded. Otherwise blocks for the calibration interval. There is
    /// no timeout: a timer that never fires stalls the caller.
    pub fn calibrate_once<T, R>(&mut self, source: PowerSource, timer: &mut T, rtc: &mut R)
    where
        T: OneShotTimer,
        R: RtcDriver,
    {
        if source != PowerSource::Battery || self.state == CalibrationState::Done {
            return;
        }

        critical_section::with(|_| self.state = CalibrationState::InProgress);
        info!("calibration: started ({} ms)", CALIBRATION_INTERVAL_MS);

        self.fired.reset();
        timer.arm(CALIBRATION_INTERVAL_MS, self.fired);
        while !self.fired.is_signaled() {
            core::hint::spin_loop();
        }

        let latency = rtc.measure_wakeup_latency();
        rtc.record_wakeup_latency(latency);

        critical_section::with(|_| self.state = CalibrationState::Done);
        info!("calibration: done, wakeup latency {}", latency);
    }

    /// Current progress
    #[must_use]
    pub const fn state(&self) -> CalibrationState {
        self.state
    }

    /// Has a latency been recorded
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == CalibrationState::Done
    }

    /// Recorded latency, `None` until the calibration has finished
    #[must_use]
    pub fn latency<R: RtcDriver>(&self, rtc: &R) -> Option<WakeupLatency> {
        self.is_done().then(|| rtc.wakeup_latency())
    }
}
