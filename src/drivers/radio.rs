//! SX1272 front end: SPI1 plus reset, DIO and TCXO lines

use embassy_stm32::mode::Blocking;
use embassy_stm32::peripherals::{PA5, PA6, PA7, SPI1};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embedded_hal::spi::SpiBus;

use crate::config::{pins, RADIO_SPI_FREQUENCY_HZ};
use crate::hal::gpio::{GpioDriver, Level, PinMode, Pull};
use crate::hal::{DriverError, RadioFrontEnd};

use super::Stm32Gpio;

/// Silicon revision register
const REG_VERSION: u8 = 0x42;

/// Revision reported by every SX1272
const SX1272_VERSION: u8 = 0x22;

/// SPI bus and SX1272 control lines
pub struct Sx1272FrontEnd {
    spi: Option<Spi<'static, Blocking>>,
    gpio: Stm32Gpio,
}

impl Sx1272FrontEnd {
    /// Front end with the bus down
    #[must_use]
    pub const fn new() -> Self {
        Self {
            spi: None,
            gpio: Stm32Gpio::new(),
        }
    }

    /// Running SPI bus, `None` while de-initialized
    pub fn bus(&mut self) -> Option<&mut Spi<'static, Blocking>> {
        self.spi.as_mut()
    }

    /// Read one radio register over the running bus
    ///
    /// # Errors
    ///
    /// [`DriverError::NotReady`] while the bus is down, [`DriverError::Hardware`]
    /// if the transfer fails.
    pub fn read_register(&mut self, addr: u8) -> Result<u8, DriverError> {
        let spi = self.spi.as_mut().ok_or(DriverError::NotReady)?;
        let mut frame = [addr & 0x7F, 0];

        self.gpio.write_pin(pins::RADIO_NSS, Level::Low);
        let result = spi.transfer_in_place(&mut frame).and_then(|()| SpiBus::<u8>::flush(spi));
        self.gpio.write_pin(pins::RADIO_NSS, Level::High);

        result.map_err(|_| DriverError::Hardware)?;
        Ok(frame[1])
    }
}

impl Default for Sx1272FrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioFrontEnd for Sx1272FrontEnd {
    fn spi_init(&mut self) -> Result<(), DriverError> {
        if self.spi.is_some() {
            return Ok(());
        }

        let mut cfg = spi::Config::default();
        cfg.frequency = Hertz(RADIO_SPI_FREQUENCY_HZ);

        // SAFETY: the bus is rebuilt after every Stop; the previous instance
        // was dropped in `spi_deinit` and nothing else uses these pins.
        let spi = unsafe {
            Spi::new_blocking(SPI1::steal(), PA5::steal(), PA7::steal(), PA6::steal(), cfg)
        };
        self.spi = Some(spi);

        self.gpio
            .configure_pin(pins::RADIO_NSS, PinMode::Output, Pull::None, Level::High)?;

        match self.read_register(REG_VERSION) {
            Ok(SX1272_VERSION) => Ok(()),
            Ok(version) => {
                warn!("radio: unexpected version {=u8:#x}", version);
                self.spi = None;
                Err(DriverError::Hardware)
            }
            Err(err) => {
                self.spi = None;
                Err(err)
            }
        }
    }

    fn spi_deinit(&mut self) {
        self.spi = None;
        for pin in [pins::RADIO_MOSI, pins::RADIO_MISO, pins::RADIO_SCLK] {
            let _ = self
                .gpio
                .configure_pin(pin, PinMode::Analog, Pull::None, Level::Low);
        }
        let _ = self
            .gpio
            .configure_pin(pins::RADIO_NSS, PinMode::Output, Pull::None, Level::High);
    }

    fn io_init(&mut self) -> Result<(), DriverError> {
        for pin in [pins::RADIO_DIO_0, pins::RADIO_DIO_1, pins::RADIO_DIO_2] {
            self.gpio
                .configure_pin(pin, PinMode::Input, Pull::Up, Level::Low)?;
        }
        Ok(())
    }

    fn io_deinit(&mut self) {
        for pin in [pins::RADIO_DIO_0, pins::RADIO_DIO_1, pins::RADIO_DIO_2] {
            let _ = self
                .gpio
                .configure_pin(pin, PinMode::Input, Pull::Down, Level::Low);
        }
    }

    fn debug_io_init(&mut self) -> Result<(), DriverError> {
        for pin in [pins::RADIO_DBG_TX, pins::RADIO_DBG_RX] {
            self.gpio
                .configure_pin(pin, PinMode::Output, Pull::None, Level::Low)?;
        }
        Ok(())
    }

    fn tcxo_init(&mut self) -> Result<(), DriverError> {
        self.gpio
            .configure_pin(pins::RADIO_TCXO_POWER, PinMode::Output, Pull::None, Level::Low)
    }
}
