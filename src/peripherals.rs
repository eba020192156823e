//! Peripheral Lifecycle
//!
//! Brings the board's peripherals up and down in a fixed order. The cold
//! sequence is:
//!
//! 1. FullSpeed clock profile
//! 2. indicator LEDs as push-pull outputs, inactive (high)
//! 3. diagnostic UART with its ring buffers
//! 4. RTC
//! 5. indicator LEDs re-driven inactive
//! 6. unused pins floated (USB on battery, JTAG without a debugger)
//! 7. ADC
//! 8. SPI bus and radio I/O
//!
//! After a wake from Stop only steps 7 and 8 are repeated. De-init undoes
//! 7 and 8 and parks the oscillator pins; the UART and RTC keep running.

use core::fmt;

use heapless::Vec;

use crate::clock::{ClockError, ClockProfileManager};
use crate::config::{pins, BoardConfig};
use crate::hal::{
    AdcDriver, AdcResolution, DriverError, GpioDriver, Level, Peripheral, PinId, PinMode,
    Platform, PowerControl, Pull, RadioFrontEnd, RtcDriver, UartConfig, UartDriver, UartFifo,
};
use crate::types::{ClockProfile, PowerSource};

/// Most pins step 6 can float (2 USB + 5 JTAG)
const MAX_FLOATED_PINS: usize = 8;

/// Initialization failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitError {
    /// The FullSpeed clock profile could not be applied
    Clock(ClockError),
    /// A peripheral driver failed
    Peripheral {
        /// Which peripheral
        peripheral: Peripheral,
        /// Driver-reported cause
        cause: DriverError,
    },
}

impl InitError {
    /// Peripheral failure helper
    #[must_use]
    pub const fn peripheral(peripheral: Peripheral, cause: DriverError) -> Self {
        Self::Peripheral { peripheral, cause }
    }
}

impl From<ClockError> for InitError {
    fn from(err: ClockError) -> Self {
        Self::Clock(err)
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock(err) => write!(f, "clock: {err}"),
            Self::Peripheral { peripheral, cause } => {
                write!(f, "{}: {cause}", peripheral.as_str())
            }
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for InitError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Clock(err) => defmt::write!(f, "Clock({})", err),
            Self::Peripheral { peripheral, cause } => {
                defmt::write!(f, "{}({})", peripheral, cause);
            }
        }
    }
}

/// Tag a driver result with the peripheral it came from
fn tag(peripheral: Peripheral, result: Result<(), DriverError>) -> Result<(), InitError> {
    result.map_err(|cause| {
        error!("init: {} failed: {}", peripheral, cause);
        InitError::peripheral(peripheral, cause)
    })
}

/// Owns the GPIO, ADC, UART, RTC and radio drivers
pub struct PeripheralLifecycle<P: Platform> {
    gpio: P::Gpio,
    adc: P::Adc,
    uart: P::Uart,
    rtc: P::Rtc,
    radio: P::Radio,
    uart_fifo: Option<UartFifo>,
    config: BoardConfig,
    initialized: bool,
    floated: Vec<PinId, MAX_FLOATED_PINS>,
}

impl<P: Platform> PeripheralLifecycle<P> {
    /// Take ownership of the drivers and the UART ring buffers
    #[must_use]
    pub fn new(
        gpio: P::Gpio,
        adc: P::Adc,
        uart: P::Uart,
        rtc: P::Rtc,
        radio: P::Radio,
        uart_fifo: UartFifo,
        config: BoardConfig,
    ) -> Self {
        Self {
            gpio,
            adc,
            uart,
            rtc,
            radio,
            uart_fifo: Some(uart_fifo),
            config,
            initialized: false,
            floated: Vec::new(),
        }
    }

    /// Run the full cold initialization sequence
    ///
    /// A second call without an intervening [`deinit_all`](Self::deinit_all)
    /// does nothing.
    ///
    /// # Errors
    ///
    /// Returns the first clock or driver failure; later steps are skipped.
    pub fn init_all(
        &mut self,
        clocks: &mut ClockProfileManager<P::Clock>,
        power: &mut P::Power,
        source: PowerSource,
    ) -> Result<(), InitError> {
        if self.initialized {
            debug!("init: peripherals already initialized");
            return Ok(());
        }

        clocks.apply_profile(ClockProfile::FullSpeed)?;

        for led in self.indicator_leds() {
            tag(
                Peripheral::Gpio,
                self.gpio
                    .configure_pin(led, PinMode::Output, Pull::None, Level::High),
            )?;
        }

        // The driver keeps the buffers; they are only handed over once
        if let Some(fifo) = self.uart_fifo.take() {
            tag(
                Peripheral::Uart,
                self.uart.init(UartConfig::diagnostic(), fifo),
            )?;
        }

        tag(Peripheral::Rtc, self.rtc.init())?;

        for led in self.indicator_leds() {
            self.gpio.write_pin(led, Level::High);
        }

        self.float_unused_pins(power, source)?;
        self.start_adc_and_radio()?;

        self.initialized = true;
        info!("init: peripherals up, {} pins floated", self.floated.len());
        Ok(())
    }

    /// Restart the ADC and radio after a wake from Stop
    ///
    /// The clock must already be back on FullSpeed.
    ///
    /// # Errors
    ///
    /// Returns the first driver failure.
    pub fn reinit_after_stop(&mut self) -> Result<(), InitError> {
        self.start_adc_and_radio()?;
        self.initialized = true;
        Ok(())
    }

    /// Shut down the ADC and radio and park the oscillator pins
    ///
    /// The UART and RTC are left running. The lifecycle counts as
    /// uninitialized from the first teardown step, also when parking a pin
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns an error if an oscillator pin cannot be reconfigured.
    pub fn deinit_all(&mut self) -> Result<(), InitError> {
        self.initialized = false;
        self.adc.deinit();
        self.radio.spi_deinit();
        self.radio.io_deinit();

        for pin in [pins::OSC_HSE_IN, pins::OSC_HSE_OUT] {
            tag(
                Peripheral::Gpio,
                self.gpio
                    .configure_pin(pin, PinMode::Analog, Pull::None, Level::High),
            )?;
        }
        for pin in [pins::OSC_LSE_IN, pins::OSC_LSE_OUT] {
            tag(
                Peripheral::Gpio,
                self.gpio
                    .configure_pin(pin, PinMode::Input, Pull::Down, Level::High),
            )?;
        }

        trace!("deinit: ADC, SPI and radio down");
        Ok(())
    }

    /// First-boot only: radio debug mirrors and TCXO supply
    ///
    /// # Errors
    ///
    /// Returns the first driver failure.
    pub fn radio_first_boot_init(&mut self) -> Result<(), InitError> {
        tag(Peripheral::Radio, self.radio.debug_io_init())?;
        tag(Peripheral::Radio, self.radio.tcxo_init())
    }

    fn start_adc_and_radio(&mut self) -> Result<(), InitError> {
        tag(Peripheral::Adc, self.adc.init())?;
        tag(Peripheral::Spi, self.radio.spi_init())?;
        tag(Peripheral::Radio, self.radio.io_init())
    }

    fn float_unused_pins(
        &mut self,
        power: &mut P::Power,
        source: PowerSource,
    ) -> Result<(), InitError> {
        self.floated.clear();

        if source == PowerSource::Battery {
            self.float(&[pins::USB_DM, pins::USB_DP])?;
        }

        power.set_debug_in_low_power(self.config.debugger);
        if !self.config.debugger {
            self.float(&pins::JTAG)?;
        }
        Ok(())
    }

    fn float(&mut self, list: &[PinId]) -> Result<(), InitError> {
        for &pin in list {
            tag(
                Peripheral::Gpio,
                self.gpio
                    .configure_pin(pin, PinMode::Analog, Pull::None, Level::Low),
            )?;
            if self.floated.push(pin).is_err() {
                warn!("init: floated pin list full");
            }
        }
        Ok(())
    }

    /// LEDs this variant drives; LED 1 only when it is the status indicator
    fn indicator_leds(&self) -> impl Iterator<Item = PinId> {
        let skip = usize::from(!self.config.indicator_led);
        pins::LEDS.into_iter().skip(skip)
    }

    /// Resolution the ADC is sampled at for this variant
    #[must_use]
    pub const fn adc_resolution(&self) -> AdcResolution {
        if self.config.encoder {
            AdcResolution::Bits10
        } else {
            AdcResolution::Bits12
        }
    }

    /// Has the cold or wake sequence completed since the last de-init
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Pins floated by the last cold initialization
    #[must_use]
    pub fn floated_pins(&self) -> &[PinId] {
        &self.floated
    }

    /// UART buffers not yet handed to the driver
    #[must_use]
    pub const fn uart_fifo_pending(&self) -> bool {
        self.uart_fifo.is_some()
    }

    /// Board variant
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Borrow the ADC
    pub fn adc_mut(&mut self) -> &mut P::Adc {
        &mut self.adc
    }

    /// Borrow the RTC
    #[must_use]
    pub const fn rtc(&self) -> &P::Rtc {
        &self.rtc
    }

    /// Borrow the RTC mutably
    pub fn rtc_mut(&mut self) -> &mut P::Rtc {
        &mut self.rtc
    }
}
