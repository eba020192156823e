//! Power Management Tests
//!
//! Tests for battery voltage estimation, level mapping, potentiometer
//! scaling and the low-power mode policy.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test power_tests

use node_firmware::power::{
    battery_level, battery_millivolts, potentiometer_level, LowPowerMode, LowPowerPolicy,
};
use node_firmware::types::{BatteryLevel, Millivolts, PowerSource};

fn level_at(mv: u32) -> u8 {
    battery_level(PowerSource::Battery, Millivolts::from_mv(mv)).code()
}

// =============================================================================
// Battery Voltage Tests
// =============================================================================

#[test]
fn voltage_from_vrefint_12bit() {
    // 1224 * 4095 / 1500 = 3341
    assert_eq!(battery_millivolts(1500, 4095).as_mv(), 3341);
}

#[test]
fn voltage_from_vrefint_10bit() {
    // 1224 * 1023 / 500 = 2504
    assert_eq!(battery_millivolts(500, 1023).as_mv(), 2504);
}

#[test]
fn voltage_full_scale_reading_is_bandgap() {
    assert_eq!(battery_millivolts(4095, 4095).as_mv(), 1224);
}

#[test]
fn voltage_zero_reading_treated_as_one() {
    assert_eq!(battery_millivolts(0, 4095), battery_millivolts(1, 4095));
}

// =============================================================================
// Battery Level Tests
// =============================================================================

#[test]
fn level_usb_is_external_power() {
    for mv in [0, 2300, 2700, 3300] {
        let level = battery_level(PowerSource::Usb, Millivolts::from_mv(mv));
        assert_eq!(level, BatteryLevel::EXTERNAL_POWER);
    }
}

#[test]
fn level_full_at_and_above_max() {
    assert_eq!(level_at(3000), 254);
    assert_eq!(level_at(3600), 254);
}

#[test]
fn level_linear_band() {
    assert_eq!(level_at(2401), 1);
    assert_eq!(level_at(2450), 22);
    assert_eq!(level_at(2700), 127);
    assert_eq!(level_at(2999), 253);
}

#[test]
fn level_linear_band_is_monotonic() {
    let mut last = 0;
    for mv in 2401..3000 {
        let code = level_at(mv);
        assert!(code >= last, "level dropped at {mv} mV");
        assert!((1..=253).contains(&code));
        last = code;
    }
}

#[test]
fn level_critical_band() {
    assert_eq!(level_at(2400), 1);
    assert_eq!(level_at(2301), 1);
}

#[test]
fn level_shutdown_at_and_below_threshold() {
    assert_eq!(level_at(2300), 255);
    assert_eq!(level_at(1800), 255);
}

// =============================================================================
// Potentiometer Tests
// =============================================================================

#[test]
fn poti_saturates_high() {
    assert_eq!(potentiometer_level(900).percent, 100);
    assert_eq!(potentiometer_level(4095).percent, 100);
}

#[test]
fn poti_saturates_low() {
    assert_eq!(potentiometer_level(10).percent, 0);
    assert_eq!(potentiometer_level(0).percent, 0);
}

#[test]
fn poti_scaled_between_limits() {
    assert_eq!(potentiometer_level(11).percent, 0);
    assert_eq!(potentiometer_level(460).percent, 50);
    // (899 - 10) * 100 / 900 = 98
    assert_eq!(potentiometer_level(899).percent, 98);
}

#[test]
fn poti_keeps_raw_code() {
    assert_eq!(potentiometer_level(321).raw, 321);
}

// =============================================================================
// Low-Power Policy Tests
// =============================================================================

#[test]
fn policy_before_init_is_sleep_only() {
    let policy = LowPowerPolicy::default();
    assert!(!policy.stop_allowed());
    assert_eq!(policy.deepest(), LowPowerMode::Sleep);
}

#[test]
fn policy_on_battery_allows_stop() {
    let policy = LowPowerPolicy::for_source(PowerSource::Battery);
    assert!(policy.stop_allowed());
    assert_eq!(policy.deepest(), LowPowerMode::Stop);
}

#[test]
fn policy_on_usb_disables_stop() {
    let policy = LowPowerPolicy::for_source(PowerSource::Usb);
    assert!(!policy.stop_allowed());
    assert_eq!(policy.deepest(), LowPowerMode::Sleep);
}

#[test]
fn policy_never_allows_off() {
    for source in [PowerSource::Battery, PowerSource::Usb] {
        assert!(!LowPowerPolicy::for_source(source).off_allowed());
    }
}
