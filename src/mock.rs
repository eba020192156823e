//! Recording mock drivers for host testing
//!
//! Every mock shares one [`MockHardware`] that models the bits of silicon
//! the controller can observe (oscillator ready flags, ADC codes, the
//! measured wakeup latency) and keeps a journal of every driver call in
//! order. Tests assert sequencing by looking at the journal.
//!
//! ```ignore
//! let (parts, hw) = mock::board_parts(PowerSource::Battery);
//! let mut board = Board::new(parts);
//! board.board_init()?;
//! assert!(hw.position(&Event::AdcInit) < hw.position(&Event::SpiInit));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::board::BoardParts;
use crate::config::{BoardConfig, UART_FIFO_RX_SIZE, UART_FIFO_TX_SIZE};
use crate::hal::{
    AdcChannel, AdcDriver, AdcResolution, AhbPrescaler, ClockTree, DriverError, GpioDriver,
    Level, MsiRange, OneShotTimer, Peripheral, PinId, PinMode, Platform, PowerControl, Pull,
    RadioFrontEnd, RtcClockSource, RtcDriver, SysClkSource, TimerFired, UartConfig, UartDriver,
    UartFifo, VoltageRange, WatchdogDriver, WatchdogKind,
};
use crate::types::{DeviceIdWords, PowerSource, WakeupLatency};

/// One recorded driver call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// PWR interface clock enabled
    PowerInterface,
    /// Voltage range requested
    Voltage(VoltageRange),
    /// HSE switched
    Hse(bool),
    /// LSE switched
    Lse(bool),
    /// HSI switched
    Hsi(bool),
    /// LSI switched
    Lsi(bool),
    /// Flash wait states set
    FlashLatency(u8),
    /// PLL configured
    PllConfig {
        /// Multiplier
        multiplier: u8,
        /// Divider
        divider: u8,
    },
    /// PLL switched
    Pll(bool),
    /// System clock source requested
    SysClk(SysClkSource),
    /// MSI range set
    Msi(MsiRange),
    /// AHB prescaler set
    Prescaler(AhbPrescaler),
    /// RTC clock routed
    RtcClock(RtcClockSource),
    /// Pin configured
    PinConfig {
        /// Pin
        pin: PinId,
        /// Mode
        mode: PinMode,
        /// Pull resistor
        pull: Pull,
        /// Initial level
        level: Level,
    },
    /// Output driven
    PinWrite {
        /// Pin
        pin: PinId,
        /// Level
        level: Level,
    },
    /// ADC powered up
    AdcInit,
    /// ADC powered down
    AdcDeinit,
    /// Conversion on a channel
    AdcRead(AdcChannel, AdcResolution),
    /// UART configured with buffers of the given sizes
    UartInit {
        /// Line settings
        config: UartConfig,
        /// Transmit buffer size
        tx: usize,
        /// Receive buffer size
        rx: usize,
    },
    /// SPI bus brought up from down
    SpiInit,
    /// SPI bus down
    SpiDeinit,
    /// Radio lines configured
    RadioIoInit,
    /// Radio lines floated
    RadioIoDeinit,
    /// Radio debug mirrors configured
    RadioDebugIoInit,
    /// TCXO control configured
    TcxoInit,
    /// RTC started
    RtcInit,
    /// Wakeup latency measured
    LatencyMeasured,
    /// Wakeup latency stored
    LatencyRecorded(WakeupLatency),
    /// One-shot timer armed
    TimerArmed(u32),
    /// Watchdog started
    WatchdogInit(WatchdogKind),
    /// Watchdog reloaded
    WatchdogFeed,
    /// PVD disabled
    PvdDisabled,
    /// Wakeup flag cleared
    WakeupFlagCleared,
    /// Ultra-low-power enabled
    UltraLowPower,
    /// Fast wakeup enabled
    FastWakeup,
    /// Debug-in-low-power set
    DebugInLowPower(bool),
    /// Sleep entered and left
    SleepWfi,
    /// Stop entered and left
    StopWfi,
    /// System reset
    Reset,
}

/// Simulated silicon shared by all mock drivers
#[derive(Debug)]
pub struct MockHardware {
    journal: RefCell<Vec<Event>>,
    hse_on: Cell<bool>,
    lse_on: Cell<bool>,
    pll_on: Cell<bool>,
    spi_up: Cell<bool>,
    sysclk: Cell<SysClkSource>,
    hse_fault: Cell<bool>,
    lse_fault: Cell<bool>,
    pll_fault: Cell<bool>,
    switch_fault: Cell<bool>,
    driver_fault: Cell<Option<(Peripheral, DriverError)>>,
    vrefint_raw: Cell<u16>,
    poti_raw: Cell<u16>,
    measured_latency: Cell<WakeupLatency>,
    auto_fire: Cell<bool>,
}

impl Default for MockHardware {
    fn default() -> Self {
        Self {
            journal: RefCell::new(Vec::new()),
            hse_on: Cell::new(false),
            lse_on: Cell::new(false),
            pll_on: Cell::new(false),
            spi_up: Cell::new(false),
            sysclk: Cell::new(SysClkSource::Msi),
            hse_fault: Cell::new(false),
            lse_fault: Cell::new(false),
            pll_fault: Cell::new(false),
            switch_fault: Cell::new(false),
            driver_fault: Cell::new(None),
            // 1224 * 4095 / 1500 = 3341 mV
            vrefint_raw: Cell::new(1500),
            poti_raw: Cell::new(0),
            measured_latency: Cell::new(WakeupLatency::from_millis(3)),
            auto_fire: Cell::new(true),
        }
    }
}

impl MockHardware {
    fn record(&self, event: Event) {
        self.journal.borrow_mut().push(event);
    }

    fn check(&self, peripheral: Peripheral) -> Result<(), DriverError> {
        match self.driver_fault.get() {
            Some((p, cause)) if p == peripheral => Err(cause),
            _ => Ok(()),
        }
    }

    /// Copy of the journal
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.journal.borrow().clone()
    }

    /// Index of the first occurrence of `event`
    #[must_use]
    pub fn position(&self, event: &Event) -> Option<usize> {
        self.journal.borrow().iter().position(|e| e == event)
    }

    /// Index of the last occurrence of `event`
    #[must_use]
    pub fn last_position(&self, event: &Event) -> Option<usize> {
        self.journal.borrow().iter().rposition(|e| e == event)
    }

    /// Number of occurrences of `event`
    #[must_use]
    pub fn count(&self, event: &Event) -> usize {
        self.journal.borrow().iter().filter(|e| *e == event).count()
    }

    /// Journal contains `event`
    #[must_use]
    pub fn contains(&self, event: &Event) -> bool {
        self.position(event).is_some()
    }

    /// Forget all recorded events
    pub fn clear(&self) {
        self.journal.borrow_mut().clear();
    }

    /// HSE never reports ready
    pub fn fail_hse(&self, fail: bool) {
        self.hse_fault.set(fail);
    }

    /// LSE never reports ready
    pub fn fail_lse(&self, fail: bool) {
        self.lse_fault.set(fail);
    }

    /// PLL never locks
    pub fn fail_pll(&self, fail: bool) {
        self.pll_fault.set(fail);
    }

    /// System clock never switches to the PLL
    pub fn fail_switch(&self, fail: bool) {
        self.switch_fault.set(fail);
    }

    /// Make one peripheral's init report `cause`
    pub fn fail_driver(&self, peripheral: Peripheral, cause: DriverError) {
        self.driver_fault.set(Some((peripheral, cause)));
    }

    /// Clear an injected driver failure
    pub fn clear_driver_fault(&self) {
        self.driver_fault.set(None);
    }

    /// Code returned for the VREFINT channel
    pub fn set_vrefint_raw(&self, raw: u16) {
        self.vrefint_raw.set(raw);
    }

    /// Code returned for the potentiometer channel
    pub fn set_poti_raw(&self, raw: u16) {
        self.poti_raw.set(raw);
    }

    /// Latency the RTC reports when measured
    pub fn set_measured_latency(&self, latency: WakeupLatency) {
        self.measured_latency.set(latency);
    }

    /// Fire the one-shot timer from inside `arm`
    ///
    /// When off, the test must signal the flag itself (for example from a
    /// spawned thread) or the calibration never finishes.
    pub fn set_timer_auto_fire(&self, auto_fire: bool) {
        self.auto_fire.set(auto_fire);
    }

    /// Source the mock system clock runs on
    #[must_use]
    pub fn system_clock(&self) -> SysClkSource {
        self.sysclk.get()
    }

    /// HSE oscillator enabled
    #[must_use]
    pub fn hse_enabled(&self) -> bool {
        self.hse_on.get()
    }

    /// PLL enabled
    #[must_use]
    pub fn pll_enabled(&self) -> bool {
        self.pll_on.get()
    }

    /// Radio SPI bus running
    #[must_use]
    pub fn spi_running(&self) -> bool {
        self.spi_up.get()
    }
}

/// Shared handle to the simulated hardware
pub type Hardware = Rc<MockHardware>;

// =============================================================================
// Drivers
// =============================================================================

/// Mock RCC / PWR / FLASH
#[derive(Debug)]
pub struct MockClockTree(Hardware);

impl ClockTree for MockClockTree {
    fn enable_power_interface(&mut self) {
        self.0.record(Event::PowerInterface);
    }

    fn set_voltage_range(&mut self, range: VoltageRange) {
        self.0.record(Event::Voltage(range));
    }

    fn voltage_regulator_ready(&self) -> bool {
        true
    }

    fn set_hse(&mut self, on: bool) {
        self.0.hse_on.set(on);
        self.0.record(Event::Hse(on));
    }

    fn hse_ready(&self) -> bool {
        self.0.hse_on.get() && !self.0.hse_fault.get()
    }

    fn set_lse(&mut self, on: bool) {
        self.0.lse_on.set(on);
        self.0.record(Event::Lse(on));
    }

    fn lse_ready(&self) -> bool {
        self.0.lse_on.get() && !self.0.lse_fault.get()
    }

    fn set_hsi(&mut self, on: bool) {
        self.0.record(Event::Hsi(on));
    }

    fn set_lsi(&mut self, on: bool) {
        self.0.record(Event::Lsi(on));
    }

    fn set_flash_latency(&mut self, wait_states: u8) {
        self.0.record(Event::FlashLatency(wait_states));
    }

    fn configure_pll(&mut self, multiplier: u8, divider: u8) {
        self.0.record(Event::PllConfig {
            multiplier,
            divider,
        });
    }

    fn set_pll(&mut self, on: bool) {
        self.0.pll_on.set(on);
        self.0.record(Event::Pll(on));
    }

    fn pll_ready(&self) -> bool {
        self.0.pll_on.get() && self.hse_ready() && !self.0.pll_fault.get()
    }

    fn select_system_clock(&mut self, source: SysClkSource) {
        self.0.record(Event::SysClk(source));
        let switches = match source {
            SysClkSource::Pll => self.pll_ready() && !self.0.switch_fault.get(),
            SysClkSource::Hse => self.hse_ready(),
            SysClkSource::Msi | SysClkSource::Hsi => true,
        };
        if switches {
            self.0.sysclk.set(source);
        }
    }

    fn system_clock(&self) -> SysClkSource {
        self.0.sysclk.get()
    }

    fn set_msi_range(&mut self, range: MsiRange) {
        self.0.record(Event::Msi(range));
    }

    fn set_bus_prescalers(&mut self, ahb: AhbPrescaler) {
        self.0.record(Event::Prescaler(ahb));
    }

    fn select_rtc_clock(&mut self, source: RtcClockSource) {
        self.0.record(Event::RtcClock(source));
    }
}

/// Mock GPIO banks
#[derive(Debug)]
pub struct MockGpio(Hardware);

impl GpioDriver for MockGpio {
    fn configure_pin(
        &mut self,
        pin: PinId,
        mode: PinMode,
        pull: Pull,
        initial: Level,
    ) -> Result<(), DriverError> {
        self.0.check(Peripheral::Gpio)?;
        self.0.record(Event::PinConfig {
            pin,
            mode,
            pull,
            level: initial,
        });
        Ok(())
    }

    fn write_pin(&mut self, pin: PinId, level: Level) {
        self.0.record(Event::PinWrite { pin, level });
    }
}

/// Mock ADC
#[derive(Debug)]
pub struct MockAdc(Hardware);

impl AdcDriver for MockAdc {
    fn init(&mut self) -> Result<(), DriverError> {
        self.0.check(Peripheral::Adc)?;
        self.0.record(Event::AdcInit);
        Ok(())
    }

    fn deinit(&mut self) {
        self.0.record(Event::AdcDeinit);
    }

    fn read_channel(&mut self, channel: AdcChannel, resolution: AdcResolution) -> u16 {
        self.0.record(Event::AdcRead(channel, resolution));
        if channel == AdcChannel::VREFINT {
            self.0.vrefint_raw.get()
        } else if channel == AdcChannel::POTI {
            self.0.poti_raw.get()
        } else {
            0
        }
    }
}

/// Mock diagnostic UART; keeps the buffers it is given
#[derive(Debug)]
pub struct MockUart {
    hw: Hardware,
    fifo: Option<UartFifo>,
}

impl MockUart {
    /// Buffers handed over by `init`
    #[must_use]
    pub fn fifo(&self) -> Option<&UartFifo> {
        self.fifo.as_ref()
    }
}

impl UartDriver for MockUart {
    fn init(&mut self, config: UartConfig, fifo: UartFifo) -> Result<(), DriverError> {
        self.hw.check(Peripheral::Uart)?;
        self.hw.record(Event::UartInit {
            config,
            tx: fifo.tx_capacity(),
            rx: fifo.rx_capacity(),
        });
        self.fifo = Some(fifo);
        Ok(())
    }
}

/// Mock SPI bus and radio lines
#[derive(Debug)]
pub struct MockRadio(Hardware);

impl RadioFrontEnd for MockRadio {
    fn spi_init(&mut self) -> Result<(), DriverError> {
        self.0.check(Peripheral::Spi)?;
        if self.0.spi_up.get() {
            return Ok(());
        }
        self.0.spi_up.set(true);
        self.0.record(Event::SpiInit);
        Ok(())
    }

    fn spi_deinit(&mut self) {
        self.0.spi_up.set(false);
        self.0.record(Event::SpiDeinit);
    }

    fn io_init(&mut self) -> Result<(), DriverError> {
        self.0.check(Peripheral::Radio)?;
        self.0.record(Event::RadioIoInit);
        Ok(())
    }

    fn io_deinit(&mut self) {
        self.0.record(Event::RadioIoDeinit);
    }

    fn debug_io_init(&mut self) -> Result<(), DriverError> {
        self.0.check(Peripheral::Radio)?;
        self.0.record(Event::RadioDebugIoInit);
        Ok(())
    }

    fn tcxo_init(&mut self) -> Result<(), DriverError> {
        self.0.check(Peripheral::Radio)?;
        self.0.record(Event::TcxoInit);
        Ok(())
    }
}

/// Mock RTC
#[derive(Debug)]
pub struct MockRtc {
    hw: Hardware,
    latency: WakeupLatency,
}

impl RtcDriver for MockRtc {
    fn init(&mut self) -> Result<(), DriverError> {
        self.hw.check(Peripheral::Rtc)?;
        self.hw.record(Event::RtcInit);
        Ok(())
    }

    fn measure_wakeup_latency(&mut self) -> WakeupLatency {
        self.hw.record(Event::LatencyMeasured);
        self.hw.measured_latency.get()
    }

    fn record_wakeup_latency(&mut self, latency: WakeupLatency) {
        self.hw.record(Event::LatencyRecorded(latency));
        self.latency = latency;
    }

    fn wakeup_latency(&self) -> WakeupLatency {
        self.latency
    }
}

/// Mock one-shot timer
#[derive(Debug)]
pub struct MockTimer(Hardware);

impl OneShotTimer for MockTimer {
    fn arm(&mut self, duration_ms: u32, fired: &'static TimerFired) {
        self.0.record(Event::TimerArmed(duration_ms));
        if self.0.auto_fire.get() {
            fired.signal();
        }
    }
}

/// Mock watchdog
#[derive(Debug)]
pub struct MockWatchdog(Hardware);

impl WatchdogDriver for MockWatchdog {
    fn init(&mut self, kind: WatchdogKind) -> Result<(), DriverError> {
        self.0.check(Peripheral::Watchdog)?;
        self.0.record(Event::WatchdogInit(kind));
        Ok(())
    }

    fn feed(&mut self) {
        self.0.record(Event::WatchdogFeed);
    }
}

/// Mock power controller
///
/// Entering Stop drops the simulated clock tree back to MSI with HSE and
/// the PLL off, as the silicon does.
#[derive(Debug)]
pub struct MockPower(Hardware);

impl PowerControl for MockPower {
    fn disable_pvd(&mut self) {
        self.0.record(Event::PvdDisabled);
    }

    fn clear_wakeup_flag(&mut self) {
        self.0.record(Event::WakeupFlagCleared);
    }

    fn enable_ultra_low_power(&mut self) {
        self.0.record(Event::UltraLowPower);
    }

    fn enable_fast_wakeup(&mut self) {
        self.0.record(Event::FastWakeup);
    }

    fn set_debug_in_low_power(&mut self, enabled: bool) {
        self.0.record(Event::DebugInLowPower(enabled));
    }

    fn wait_for_interrupt_sleep(&mut self) {
        self.0.record(Event::SleepWfi);
    }

    fn wait_for_interrupt_stop(&mut self) {
        self.0.record(Event::StopWfi);
        self.0.hse_on.set(false);
        self.0.pll_on.set(false);
        self.0.sysclk.set(SysClkSource::Msi);
    }

    fn system_reset(&mut self) -> ! {
        self.0.record(Event::Reset);
        panic!("system reset");
    }
}

/// Platform made of the recording mocks
#[derive(Debug)]
pub struct MockPlatform;

impl Platform for MockPlatform {
    type Clock = MockClockTree;
    type Gpio = MockGpio;
    type Adc = MockAdc;
    type Uart = MockUart;
    type Radio = MockRadio;
    type Rtc = MockRtc;
    type Timer = MockTimer;
    type Watchdog = MockWatchdog;
    type Power = MockPower;
}

/// Identifier words used by [`board_parts`]
pub const MOCK_DEVICE_ID: DeviceIdWords = DeviceIdWords::new(0x0102_0304, 0xA0B0_C0D0, 0x1000_0000);

/// Fresh `'static` UART buffers
#[must_use]
pub fn leak_fifo() -> UartFifo {
    UartFifo::new(
        Box::leak(Box::new([0u8; UART_FIFO_TX_SIZE])),
        Box::leak(Box::new([0u8; UART_FIFO_RX_SIZE])),
    )
}

/// Fresh `'static` calibration flag
#[must_use]
pub fn leak_flag() -> &'static TimerFired {
    Box::leak(Box::new(TimerFired::new()))
}

/// Parts for the default board variant
#[must_use]
pub fn board_parts(source: PowerSource) -> (BoardParts<MockPlatform>, Hardware) {
    board_parts_with(BoardConfig::default(), source, leak_flag())
}

/// Parts for any variant, signaling calibration through `fired`
#[must_use]
pub fn board_parts_with(
    config: BoardConfig,
    source: PowerSource,
    fired: &'static TimerFired,
) -> (BoardParts<MockPlatform>, Hardware) {
    let hw: Hardware = Rc::new(MockHardware::default());
    let parts = BoardParts {
        clock: MockClockTree(Rc::clone(&hw)),
        gpio: MockGpio(Rc::clone(&hw)),
        adc: MockAdc(Rc::clone(&hw)),
        uart: MockUart {
            hw: Rc::clone(&hw),
            fifo: None,
        },
        radio: MockRadio(Rc::clone(&hw)),
        rtc: MockRtc {
            hw: Rc::clone(&hw),
            latency: WakeupLatency::ZERO,
        },
        timer: MockTimer(Rc::clone(&hw)),
        watchdog: MockWatchdog(Rc::clone(&hw)),
        power: MockPower(Rc::clone(&hw)),
        uart_fifo: leak_fifo(),
        device_id: MOCK_DEVICE_ID,
        source,
        calibration_fired: fired,
        config,
    };
    (parts, hw)
}

/// Standalone clock tree for clock manager tests
#[must_use]
pub fn clock_tree() -> (MockClockTree, Hardware) {
    let hw: Hardware = Rc::new(MockHardware::default());
    (MockClockTree(Rc::clone(&hw)), hw)
}

/// Standalone RTC and timer for calibrator tests
#[must_use]
pub fn rtc_and_timer() -> (MockRtc, MockTimer, Hardware) {
    let hw: Hardware = Rc::new(MockHardware::default());
    let rtc = MockRtc {
        hw: Rc::clone(&hw),
        latency: WakeupLatency::ZERO,
    };
    (rtc, MockTimer(Rc::clone(&hw)), hw)
}
