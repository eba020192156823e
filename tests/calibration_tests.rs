//! Wakeup Calibration Tests
//!
//! Tests for the one-shot Stop wakeup latency calibration and its
//! timer-to-thread handoff.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test calibration_tests

use std::thread;
use std::time::Duration;

use node_firmware::calibration::WakeupCalibrator;
use node_firmware::hal::{RtcDriver, TimerFired};
use node_firmware::mock::{leak_flag, rtc_and_timer, Event};
use node_firmware::types::{CalibrationState, PowerSource, WakeupLatency};

// =============================================================================
// Timer Flag Tests
// =============================================================================

#[test]
fn timer_flag_starts_clear() {
    let flag = TimerFired::new();
    assert!(!flag.is_signaled());
    flag.signal();
    assert!(flag.is_signaled());
    flag.reset();
    assert!(!flag.is_signaled());
}

// =============================================================================
// Calibration Flow Tests
// =============================================================================

#[test]
fn new_calibrator_not_started() {
    let calibrator = WakeupCalibrator::new(leak_flag());
    assert_eq!(calibrator.state(), CalibrationState::NotStarted);
    assert!(!calibrator.is_done());
}

#[test]
fn usb_power_skips_calibration() {
    let (mut rtc, mut timer, hw) = rtc_and_timer();
    let mut calibrator = WakeupCalibrator::new(leak_flag());

    calibrator.calibrate_once(PowerSource::Usb, &mut timer, &mut rtc);

    assert_eq!(calibrator.state(), CalibrationState::NotStarted);
    assert!(hw.events().is_empty(), "no timer or RTC access on USB");
    assert_eq!(calibrator.latency(&rtc), None);
}

#[test]
fn battery_calibration_records_latency() {
    let (mut rtc, mut timer, hw) = rtc_and_timer();
    hw.set_measured_latency(WakeupLatency::from_millis(5));
    let mut calibrator = WakeupCalibrator::new(leak_flag());

    calibrator.calibrate_once(PowerSource::Battery, &mut timer, &mut rtc);

    assert_eq!(
        hw.events(),
        vec![
            Event::TimerArmed(1000),
            Event::LatencyMeasured,
            Event::LatencyRecorded(WakeupLatency::from_millis(5)),
        ]
    );
    assert_eq!(calibrator.state(), CalibrationState::Done);
    assert_eq!(rtc.wakeup_latency(), WakeupLatency::from_millis(5));
    assert_eq!(
        calibrator.latency(&rtc),
        Some(WakeupLatency::from_millis(5))
    );
}

#[test]
fn calibration_runs_once() {
    let (mut rtc, mut timer, hw) = rtc_and_timer();
    let mut calibrator = WakeupCalibrator::new(leak_flag());

    calibrator.calibrate_once(PowerSource::Battery, &mut timer, &mut rtc);
    calibrator.calibrate_once(PowerSource::Battery, &mut timer, &mut rtc);

    assert_eq!(hw.count(&Event::TimerArmed(1000)), 1, "timer armed once");
    assert_eq!(hw.count(&Event::LatencyMeasured), 1);
}

// =============================================================================
// Handoff Tests
// =============================================================================

#[test]
fn waits_for_timer_from_another_context() {
    let (mut rtc, mut timer, hw) = rtc_and_timer();
    hw.set_timer_auto_fire(false);
    let flag = leak_flag();

    let isr = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        flag.signal();
    });

    let mut calibrator = WakeupCalibrator::new(flag);
    calibrator.calibrate_once(PowerSource::Battery, &mut timer, &mut rtc);
    isr.join().unwrap();

    assert_eq!(calibrator.state(), CalibrationState::Done);
    assert!(hw.position(&Event::TimerArmed(1000)) < hw.position(&Event::LatencyMeasured));
}
