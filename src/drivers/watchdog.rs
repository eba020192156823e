//! Independent watchdog

use embassy_stm32::peripherals::IWDG;
use embassy_stm32::wdg::IndependentWatchdog;

use crate::config::WATCHDOG_TIMEOUT_US;
use crate::hal::{DriverError, WatchdogDriver, WatchdogKind};

/// IWDG; once started it cannot be stopped
pub struct Stm32Watchdog {
    iwdg: Option<IWDG>,
    running: Option<IndependentWatchdog<'static, IWDG>>,
}

impl Stm32Watchdog {
    /// Hold the peripheral until `init`
    #[must_use]
    pub fn new(iwdg: IWDG) -> Self {
        Self {
            iwdg: Some(iwdg),
            running: None,
        }
    }
}

impl WatchdogDriver for Stm32Watchdog {
    fn init(&mut self, kind: WatchdogKind) -> Result<(), DriverError> {
        if kind != WatchdogKind::Independent {
            return Err(DriverError::InvalidConfig);
        }

        if let Some(wdg) = self.running.as_mut() {
            wdg.pet();
            return Ok(());
        }

        let iwdg = self.iwdg.take().ok_or(DriverError::Busy)?;
        let mut wdg = IndependentWatchdog::new(iwdg, WATCHDOG_TIMEOUT_US);
        wdg.unleash();
        self.running = Some(wdg);
        Ok(())
    }

    fn feed(&mut self) {
        if let Some(wdg) = self.running.as_mut() {
            wdg.pet();
        }
    }
}
