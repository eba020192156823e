//! Peripheral Lifecycle Tests
//!
//! Tests for the cold initialization order, board variants, pin floating,
//! de-initialization before Stop and re-initialization after it.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test peripheral_tests

use node_firmware::clock::{ClockError, ClockProfileManager};
use node_firmware::config::{pins, BoardConfig};
use node_firmware::hal::{
    AdcResolution, DriverError, Level, Peripheral, PinId, PinMode, Pull, RtcClockSource,
    UartConfig,
};
use node_firmware::mock::{
    board_parts_with, leak_flag, Event, Hardware, MockClockTree, MockPlatform, MockPower,
};
use node_firmware::peripherals::{InitError, PeripheralLifecycle};
use node_firmware::types::{ClockProfile, PowerSource};

struct Rig {
    clocks: ClockProfileManager<MockClockTree>,
    power: MockPower,
    periph: PeripheralLifecycle<MockPlatform>,
    hw: Hardware,
}

fn rig_with(config: BoardConfig, source: PowerSource) -> Rig {
    let (parts, hw) = board_parts_with(config, source, leak_flag());
    Rig {
        clocks: ClockProfileManager::new(parts.clock),
        power: parts.power,
        periph: PeripheralLifecycle::new(
            parts.gpio,
            parts.adc,
            parts.uart,
            parts.rtc,
            parts.radio,
            parts.uart_fifo,
            parts.config,
        ),
        hw,
    }
}

fn rig() -> Rig {
    rig_with(BoardConfig::default(), PowerSource::Battery)
}

impl Rig {
    fn init(&mut self, source: PowerSource) -> Result<(), InitError> {
        self.periph.init_all(&mut self.clocks, &mut self.power, source)
    }
}

fn led_config(pin: PinId) -> Event {
    Event::PinConfig {
        pin,
        mode: PinMode::Output,
        pull: Pull::None,
        level: Level::High,
    }
}

fn floated(pin: PinId) -> Event {
    Event::PinConfig {
        pin,
        mode: PinMode::Analog,
        pull: Pull::None,
        level: Level::Low,
    }
}

fn uart_init() -> Event {
    Event::UartInit {
        config: UartConfig::diagnostic(),
        tx: 1024,
        rx: 1024,
    }
}

fn pos(hw: &Hardware, event: Event) -> usize {
    hw.position(&event)
        .unwrap_or_else(|| panic!("{event:?} not recorded"))
}

// =============================================================================
// Cold Initialization Order Tests
// =============================================================================

#[test]
fn cold_init_order() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).expect("init should succeed");
    let hw = &rig.hw;

    let clock_done = pos(hw, Event::RtcClock(RtcClockSource::Lse));
    let first_led = pos(hw, led_config(pins::LED_1));
    let uart = pos(hw, uart_init());
    let rtc = pos(hw, Event::RtcInit);
    let led_write = pos(
        hw,
        Event::PinWrite {
            pin: pins::LED_1,
            level: Level::High,
        },
    );
    let usb = pos(hw, floated(pins::USB_DM));
    let jtag = pos(hw, floated(pins::JTAG_TMS));
    let adc = pos(hw, Event::AdcInit);
    let spi = pos(hw, Event::SpiInit);
    let radio = pos(hw, Event::RadioIoInit);

    assert!(clock_done < first_led, "clock before LEDs");
    assert!(first_led < uart, "LEDs before UART");
    assert!(uart < rtc, "UART before RTC");
    assert!(rtc < led_write, "RTC before LED write");
    assert!(led_write < usb, "LED write before floating");
    assert!(usb < jtag, "USB floated before JTAG");
    assert!(jtag < adc, "floating before ADC");
    assert!(adc < spi, "ADC before SPI");
    assert!(spi < radio, "SPI before radio I/O");
}

#[test]
fn cold_init_applies_full_speed() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();
    assert!(rig.clocks.is_running_on(ClockProfile::FullSpeed));
    assert!(rig.periph.is_initialized());
}

#[test]
fn all_leds_configured_inactive() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();
    for led in pins::LEDS {
        assert!(rig.hw.contains(&led_config(led)), "{led} not configured");
        assert!(rig.hw.contains(&Event::PinWrite {
            pin: led,
            level: Level::High
        }));
    }
}

#[test]
fn uart_gets_diagnostic_settings_and_buffers() {
    let mut rig = rig();
    assert!(rig.periph.uart_fifo_pending());
    rig.init(PowerSource::Battery).unwrap();
    assert_eq!(rig.hw.count(&uart_init()), 1);
    assert!(!rig.periph.uart_fifo_pending(), "buffers handed to the driver");
}

#[test]
fn radio_first_boot_init_order() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();
    rig.periph.radio_first_boot_init().unwrap();
    assert!(pos(&rig.hw, Event::RadioDebugIoInit) < pos(&rig.hw, Event::TcxoInit));
}

#[test]
fn second_init_is_a_no_op() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();
    rig.hw.clear();

    rig.init(PowerSource::Battery).unwrap();
    assert!(rig.hw.events().is_empty(), "nothing should be re-run");
}

// =============================================================================
// Variant Tests
// =============================================================================

#[test]
fn led1_skipped_without_indicator() {
    let config = BoardConfig {
        indicator_led: false,
        ..BoardConfig::default()
    };
    let mut rig = rig_with(config, PowerSource::Battery);
    rig.init(PowerSource::Battery).unwrap();

    assert!(!rig.hw.contains(&led_config(pins::LED_1)));
    assert!(rig.hw.contains(&led_config(pins::LED_2)));
    assert!(rig.hw.contains(&led_config(pins::LED_4)));
}

#[test]
fn encoder_variant_samples_at_10_bits() {
    let config = BoardConfig {
        encoder: true,
        ..BoardConfig::default()
    };
    let rig = rig_with(config, PowerSource::Battery);
    assert_eq!(rig.periph.adc_resolution(), AdcResolution::Bits10);
    assert_eq!(rig.periph.config(), &config);
}

#[test]
fn default_variant_samples_at_12_bits() {
    assert_eq!(rig().periph.adc_resolution(), AdcResolution::Bits12);
}

// =============================================================================
// Pin Floating Tests
// =============================================================================

#[test]
fn battery_without_debugger_floats_usb_and_jtag() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();

    assert_eq!(rig.periph.floated_pins().len(), 7);
    assert!(rig.hw.contains(&Event::DebugInLowPower(false)));
    for pin in [pins::USB_DM, pins::USB_DP] {
        assert!(rig.hw.contains(&floated(pin)), "{pin} not floated");
    }
    for pin in pins::JTAG {
        assert!(rig.hw.contains(&floated(pin)), "{pin} not floated");
    }
}

#[test]
fn usb_power_keeps_usb_pins() {
    let mut rig = rig_with(BoardConfig::default(), PowerSource::Usb);
    rig.init(PowerSource::Usb).unwrap();

    assert!(!rig.hw.contains(&floated(pins::USB_DM)));
    assert!(!rig.hw.contains(&floated(pins::USB_DP)));
    assert_eq!(rig.periph.floated_pins(), &pins::JTAG);
}

#[test]
fn debugger_keeps_jtag_alive() {
    let config = BoardConfig {
        debugger: true,
        ..BoardConfig::default()
    };
    let mut rig = rig_with(config, PowerSource::Battery);
    rig.init(PowerSource::Battery).unwrap();

    assert!(rig.hw.contains(&Event::DebugInLowPower(true)));
    for pin in pins::JTAG {
        assert!(!rig.hw.contains(&floated(pin)), "{pin} must stay on JTAG");
    }
    assert_eq!(rig.periph.floated_pins(), &[pins::USB_DM, pins::USB_DP]);
}

#[test]
fn usb_with_debugger_floats_nothing() {
    let config = BoardConfig {
        debugger: true,
        ..BoardConfig::default()
    };
    let mut rig = rig_with(config, PowerSource::Usb);
    rig.init(PowerSource::Usb).unwrap();
    assert!(rig.periph.floated_pins().is_empty());
}

// =============================================================================
// De-initialization Tests
// =============================================================================

#[test]
fn deinit_stops_adc_and_radio_only() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();
    rig.hw.clear();

    rig.periph.deinit_all().unwrap();
    let events = rig.hw.events();

    assert_eq!(
        events[..3],
        [Event::AdcDeinit, Event::SpiDeinit, Event::RadioIoDeinit]
    );
    assert!(!events.iter().any(|e| matches!(e, Event::UartInit { .. })));
    assert!(!events.contains(&Event::RtcInit));
    assert!(!rig.periph.is_initialized());
}

#[test]
fn failed_deinit_counts_as_uninitialized() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();
    rig.hw.fail_driver(Peripheral::Gpio, DriverError::Hardware);

    assert_eq!(
        rig.periph.deinit_all(),
        Err(InitError::peripheral(Peripheral::Gpio, DriverError::Hardware))
    );
    assert!(!rig.periph.is_initialized());
    assert!(!rig.hw.spi_running());
}

#[test]
fn deinit_parks_oscillator_pins() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();
    rig.periph.deinit_all().unwrap();

    for pin in [pins::OSC_HSE_IN, pins::OSC_HSE_OUT] {
        assert!(rig.hw.contains(&Event::PinConfig {
            pin,
            mode: PinMode::Analog,
            pull: Pull::None,
            level: Level::High,
        }));
    }
    for pin in [pins::OSC_LSE_IN, pins::OSC_LSE_OUT] {
        assert!(rig.hw.contains(&Event::PinConfig {
            pin,
            mode: PinMode::Input,
            pull: Pull::Down,
            level: Level::High,
        }));
    }
}

// =============================================================================
// Re-initialization Tests
// =============================================================================

#[test]
fn reinit_restarts_adc_and_radio() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();
    rig.periph.deinit_all().unwrap();
    rig.hw.clear();

    rig.periph.reinit_after_stop().unwrap();
    assert_eq!(
        rig.hw.events(),
        vec![Event::AdcInit, Event::SpiInit, Event::RadioIoInit]
    );
    assert!(rig.periph.is_initialized());
}

#[test]
fn reinit_keeps_running_bus() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();

    rig.periph.reinit_after_stop().unwrap();
    assert!(rig.hw.spi_running());
    assert_eq!(rig.hw.count(&Event::SpiInit), 1);
    assert!(rig.periph.is_initialized());
}

#[test]
fn init_after_deinit_does_not_reinit_uart() {
    let mut rig = rig();
    rig.init(PowerSource::Battery).unwrap();
    rig.periph.deinit_all().unwrap();

    rig.init(PowerSource::Battery).unwrap();
    assert_eq!(rig.hw.count(&uart_init()), 1, "UART keeps its buffers");
    assert_eq!(rig.hw.count(&Event::RtcInit), 2);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn clock_failure_stops_init() {
    let mut rig = rig();
    rig.hw.fail_hse(true);

    let result = rig.init(PowerSource::Battery);
    assert_eq!(result, Err(InitError::Clock(ClockError::OscillatorTimeout)));
    assert!(!rig.hw.contains(&led_config(pins::LED_1)));
    assert!(!rig.periph.is_initialized());
}

#[test]
fn adc_failure_reported_before_radio() {
    let mut rig = rig();
    rig.hw.fail_driver(Peripheral::Adc, DriverError::NotReady);

    let result = rig.init(PowerSource::Battery);
    assert_eq!(
        result,
        Err(InitError::peripheral(Peripheral::Adc, DriverError::NotReady))
    );
    assert!(!rig.hw.contains(&Event::SpiInit));
    assert!(!rig.periph.is_initialized());
}

#[test]
fn spi_failure_reported() {
    let mut rig = rig();
    rig.hw.fail_driver(Peripheral::Spi, DriverError::Busy);

    let result = rig.init(PowerSource::Battery);
    assert_eq!(
        result,
        Err(InitError::peripheral(Peripheral::Spi, DriverError::Busy))
    );
    assert!(!rig.hw.contains(&Event::RadioIoInit));
}

#[test]
fn rtc_failure_reported() {
    let mut rig = rig();
    rig.hw.fail_driver(Peripheral::Rtc, DriverError::Hardware);

    let result = rig.init(PowerSource::Battery);
    assert_eq!(
        result,
        Err(InitError::peripheral(Peripheral::Rtc, DriverError::Hardware))
    );
    assert!(!rig.hw.contains(&Event::AdcInit));
}

#[test]
fn gpio_failure_reported() {
    let mut rig = rig();
    rig.hw.fail_driver(Peripheral::Gpio, DriverError::InvalidConfig);

    let result = rig.init(PowerSource::Battery);
    assert_eq!(
        result,
        Err(InitError::peripheral(
            Peripheral::Gpio,
            DriverError::InvalidConfig
        ))
    );
}

#[test]
fn init_retried_after_failure() {
    let mut rig = rig();
    rig.hw.fail_driver(Peripheral::Adc, DriverError::NotReady);
    assert!(rig.init(PowerSource::Battery).is_err());

    rig.hw.clear_driver_fault();
    rig.init(PowerSource::Battery).unwrap();
    assert!(rig.periph.is_initialized());
    assert!(rig.hw.contains(&Event::RadioIoInit));
}

#[test]
fn init_error_display() {
    let err = InitError::peripheral(Peripheral::Spi, DriverError::Busy);
    assert_eq!(err.to_string(), "SPI: busy");
    let err = InitError::from(ClockError::LseTimeout);
    assert_eq!(err.to_string(), "clock: LSE startup timeout");
}
