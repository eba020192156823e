//! Power Control Abstractions
//!
//! Low-power mode entry, regulator options and system reset.

/// PWR and core power-mode control
pub trait PowerControl {
    /// Disable the programmable voltage detector
    fn disable_pvd(&mut self);

    /// Clear the wakeup flag
    fn clear_wakeup_flag(&mut self);

    /// Turn VREFINT off in low-power modes
    fn enable_ultra_low_power(&mut self);

    /// Do not wait for VREFINT on wakeup
    fn enable_fast_wakeup(&mut self);

    /// Keep the debug port alive in Sleep and Stop
    fn set_debug_in_low_power(&mut self, enabled: bool);

    /// Halt the core with the main regulator on until an interrupt
    fn wait_for_interrupt_sleep(&mut self);

    /// Enter Stop with the low-power regulator until a wake event
    fn wait_for_interrupt_stop(&mut self);

    /// Mask interrupts and reset the MCU
    fn system_reset(&mut self) -> !;
}
