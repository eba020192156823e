//! Watchdog Abstractions

use super::DriverError;

/// Which watchdog to start
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WatchdogKind {
    /// Independent watchdog clocked from LSI
    #[default]
    Independent,
    /// Window watchdog clocked from APB
    Window,
}

#[cfg(feature = "embedded")]
impl defmt::Format for WatchdogKind {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Independent => defmt::write!(f, "IWDG"),
            Self::Window => defmt::write!(f, "WWDG"),
        }
    }
}

/// Hardware watchdog
pub trait WatchdogDriver {
    /// Start (or restart) the watchdog
    ///
    /// # Errors
    ///
    /// Returns an error if the requested watchdog is unavailable.
    fn init(&mut self, kind: WatchdogKind) -> Result<(), DriverError>;

    /// Reload the counter
    fn feed(&mut self);
}
