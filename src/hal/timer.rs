//! Timer Abstractions
//!
//! One-shot timer and the flag it raises from interrupt context.

use core::sync::atomic::{AtomicBool, Ordering};

/// Set once by a timer interrupt, observed by a waiting thread
#[derive(Debug)]
pub struct TimerFired(AtomicBool);

impl TimerFired {
    /// New, unsignaled flag
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Raise the flag; safe to call from an interrupt handler
    pub fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Has the flag been raised
    #[must_use]
    pub fn is_signaled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Lower the flag
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for TimerFired {
    fn default() -> Self {
        Self::new()
    }
}

/// Timer that fires once and signals a flag
pub trait OneShotTimer {
    /// Start a one-shot countdown; `fired` is signaled from the timer
    /// interrupt when it elapses.
    fn arm(&mut self, duration_ms: u32, fired: &'static TimerFired);
}
