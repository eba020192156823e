//! Clock Profile Manager Tests
//!
//! Tests for the FullSpeed cold and reconfigure paths, the LowPower
//! profile and oscillator failure reporting, observed through the mock
//! clock tree's event journal.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test clock_tests

use node_firmware::clock::{ClockError, ClockProfileManager};
use node_firmware::hal::{
    AhbPrescaler, ClockTree, MsiRange, RtcClockSource, SysClkSource, VoltageRange,
};
use node_firmware::mock::{clock_tree, Event};
use node_firmware::types::ClockProfile;

const PLL_CONFIG: Event = Event::PllConfig {
    multiplier: 6,
    divider: 3,
};

// =============================================================================
// FullSpeed Cold Path Tests
// =============================================================================

#[test]
fn cold_full_speed_sequence() {
    let (tree, hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);

    clocks
        .apply_profile(ClockProfile::FullSpeed)
        .expect("cold start should succeed");

    assert_eq!(
        hw.events(),
        vec![
            Event::PowerInterface,
            Event::Voltage(VoltageRange::Range1),
            Event::Hse(true),
            Event::Lse(true),
            Event::FlashLatency(1),
            PLL_CONFIG,
            Event::Pll(true),
            Event::SysClk(SysClkSource::Pll),
            Event::Prescaler(AhbPrescaler::Div1),
            Event::RtcClock(RtcClockSource::Lse),
        ]
    );
    assert_eq!(hw.system_clock(), SysClkSource::Pll);
}

#[test]
fn full_speed_reports_ready() {
    let (tree, _hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();

    assert!(clocks.is_hse_ready(), "HSE should be ready at full speed");
    assert!(clocks.is_pll_ready(), "PLL should be locked at full speed");
    assert!(clocks.is_running_on(ClockProfile::FullSpeed));
    assert_eq!(clocks.current(), Some(ClockProfile::FullSpeed));
}

#[test]
fn no_profile_before_first_application() {
    let (tree, _hw) = clock_tree();
    let clocks = ClockProfileManager::new(tree);
    assert_eq!(clocks.current(), None);
    assert!(!clocks.is_running_on(ClockProfile::LowPower));
}

#[test]
fn cold_path_keeps_pll_already_driving_sysclk() {
    let (mut tree, hw) = clock_tree();
    // Boot code already switched to HSE + PLL
    tree.set_hse(true);
    tree.configure_pll(6, 3);
    tree.set_pll(true);
    tree.select_system_clock(SysClkSource::Pll);
    hw.clear();

    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();

    assert!(!hw.contains(&PLL_CONFIG), "PLL must not be reprogrammed");
    assert!(!hw.contains(&Event::Pll(true)));
    assert!(hw.contains(&Event::RtcClock(RtcClockSource::Lse)));
    assert_eq!(hw.system_clock(), SysClkSource::Pll);
    assert!(clocks.is_running_on(ClockProfile::FullSpeed));
}

#[test]
fn cold_path_runs_only_once() {
    let (tree, hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();

    assert_eq!(hw.count(&Event::Lse(true)), 1, "LSE is started once");
    assert_eq!(hw.count(&Event::RtcClock(RtcClockSource::Lse)), 1);
    assert_eq!(hw.count(&Event::FlashLatency(1)), 1);
}

// =============================================================================
// FullSpeed Reconfigure Path Tests
// =============================================================================

#[test]
fn reconfigure_while_on_pll_only_restores_hse() {
    let (tree, hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();
    hw.clear();

    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();

    assert_eq!(
        hw.events(),
        vec![
            Event::PowerInterface,
            Event::Voltage(VoltageRange::Range1),
            Event::Hse(true),
        ]
    );
}

#[test]
fn reconfigure_after_low_power_restarts_pll() {
    let (tree, hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();
    clocks.apply_profile(ClockProfile::LowPower).unwrap();
    hw.clear();

    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();

    assert_eq!(
        hw.events(),
        vec![
            Event::PowerInterface,
            Event::Voltage(VoltageRange::Range1),
            Event::Hse(true),
            PLL_CONFIG,
            Event::Pll(true),
            Event::SysClk(SysClkSource::Pll),
        ]
    );
    assert_eq!(hw.system_clock(), SysClkSource::Pll);
    assert!(clocks.is_running_on(ClockProfile::FullSpeed));
}

#[test]
fn stop_wakeup_marks_low_power() {
    let (tree, _hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();

    clocks.note_stop_wakeup();
    assert_eq!(clocks.current(), Some(ClockProfile::LowPower));
}

#[test]
fn stop_wakeup_before_any_profile_is_ignored() {
    let (tree, _hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.note_stop_wakeup();
    assert_eq!(clocks.current(), None);
}

// =============================================================================
// LowPower Profile Tests
// =============================================================================

#[test]
fn low_power_sequence() {
    let (tree, hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();
    hw.clear();

    clocks.apply_profile(ClockProfile::LowPower).unwrap();

    assert_eq!(
        hw.events(),
        vec![
            Event::Msi(MsiRange::Range0),
            Event::SysClk(SysClkSource::Msi),
            Event::FlashLatency(0),
            Event::PowerInterface,
            Event::Voltage(VoltageRange::Range3),
            Event::Prescaler(AhbPrescaler::Div2),
            Event::Hsi(false),
            Event::Pll(false),
            Event::Hse(false),
            Event::Lsi(false),
        ]
    );
    assert_eq!(hw.system_clock(), SysClkSource::Msi);
    assert!(!hw.hse_enabled());
    assert!(!hw.pll_enabled());
    assert!(clocks.is_running_on(ClockProfile::LowPower));
}

#[test]
fn low_power_leaves_pll_before_lowering_latency_and_voltage() {
    let (tree, hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();
    assert_eq!(hw.system_clock(), SysClkSource::Pll);
    hw.clear();

    clocks.apply_profile(ClockProfile::LowPower).unwrap();

    let on_msi = hw.position(&Event::SysClk(SysClkSource::Msi)).unwrap();
    let latency = hw.position(&Event::FlashLatency(0)).unwrap();
    let range3 = hw.position(&Event::Voltage(VoltageRange::Range3)).unwrap();
    assert!(on_msi < latency, "0 wait states while still on the PLL");
    assert!(on_msi < range3, "range 3 while still on the PLL");
}

#[test]
fn low_power_keeps_lse_running() {
    let (tree, hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();
    clocks.apply_profile(ClockProfile::LowPower).unwrap();
    assert!(!hw.contains(&Event::Lse(false)), "RTC clock must survive");
}

#[test]
fn low_power_from_cold_is_allowed() {
    let (tree, hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::LowPower).unwrap();
    assert_eq!(hw.system_clock(), SysClkSource::Msi);
    // The next FullSpeed still takes the cold path
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();
    assert!(hw.contains(&Event::Lse(true)));
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn hse_failure_reported() {
    let (tree, hw) = clock_tree();
    hw.fail_hse(true);
    let mut clocks = ClockProfileManager::new(tree);

    let result = clocks.apply_profile(ClockProfile::FullSpeed);
    assert_eq!(result, Err(ClockError::OscillatorTimeout));
    assert_eq!(clocks.current(), None, "failed profile is not recorded");
    assert!(!hw.contains(&Event::Pll(true)));
}

#[test]
fn lse_failure_reported() {
    let (tree, hw) = clock_tree();
    hw.fail_lse(true);
    let mut clocks = ClockProfileManager::new(tree);

    let result = clocks.apply_profile(ClockProfile::FullSpeed);
    assert_eq!(result, Err(ClockError::LseTimeout));
    assert!(!hw.contains(&Event::FlashLatency(1)));
}

#[test]
fn pll_failure_reported() {
    let (tree, hw) = clock_tree();
    hw.fail_pll(true);
    let mut clocks = ClockProfileManager::new(tree);

    let result = clocks.apply_profile(ClockProfile::FullSpeed);
    assert_eq!(result, Err(ClockError::PllTimeout));
    assert!(!hw.contains(&Event::SysClk(SysClkSource::Pll)));
}

#[test]
fn switch_failure_reported() {
    let (tree, hw) = clock_tree();
    hw.fail_switch(true);
    let mut clocks = ClockProfileManager::new(tree);

    let result = clocks.apply_profile(ClockProfile::FullSpeed);
    assert_eq!(result, Err(ClockError::SwitchTimeout));
    assert_eq!(hw.system_clock(), SysClkSource::Msi);
}

#[test]
fn cold_path_retried_after_failure() {
    let (tree, hw) = clock_tree();
    hw.fail_lse(true);
    let mut clocks = ClockProfileManager::new(tree);
    assert!(clocks.apply_profile(ClockProfile::FullSpeed).is_err());

    hw.fail_lse(false);
    hw.clear();
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();
    assert!(hw.contains(&Event::RtcClock(RtcClockSource::Lse)));
}

#[test]
fn reconfigure_hse_failure_reported() {
    let (tree, hw) = clock_tree();
    let mut clocks = ClockProfileManager::new(tree);
    clocks.apply_profile(ClockProfile::FullSpeed).unwrap();
    clocks.apply_profile(ClockProfile::LowPower).unwrap();

    hw.fail_hse(true);
    assert_eq!(
        clocks.apply_profile(ClockProfile::FullSpeed),
        Err(ClockError::OscillatorTimeout)
    );
    assert_eq!(clocks.current(), Some(ClockProfile::LowPower));
}

#[test]
fn clock_error_display() {
    assert_eq!(
        ClockError::OscillatorTimeout.to_string(),
        "HSE startup timeout"
    );
    assert_eq!(ClockError::PllTimeout.to_string(), "PLL lock timeout");
}
