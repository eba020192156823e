//! RTC Abstractions

use super::DriverError;
use crate::types::WakeupLatency;

/// Real-time clock with stop-mode wakeup compensation
pub trait RtcDriver {
    /// Start the calendar from LSE
    ///
    /// # Errors
    ///
    /// Returns an error if the RTC cannot enter init mode.
    fn init(&mut self) -> Result<(), DriverError>;

    /// Measure the delay between a wake request and stable timekeeping
    fn measure_wakeup_latency(&mut self) -> WakeupLatency;

    /// Store the latency used to compensate future stop-mode alarms
    fn record_wakeup_latency(&mut self, latency: WakeupLatency);

    /// Latency currently in use
    fn wakeup_latency(&self) -> WakeupLatency;
}
