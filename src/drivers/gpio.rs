//! GPIO register access
//!
//! Pins are addressed by [`PinId`] so the board code can reconfigure any
//! pin (oscillator, JTAG, USB) without owning an embassy pin singleton.

use embassy_stm32::pac;
use embassy_stm32::pac::gpio::vals::{Moder, Ot, Pupdr};
use embassy_stm32::pac::gpio::Gpio;

use crate::hal::gpio::{GpioDriver, Level, PinId, PinMode, Port, Pull};
use crate::hal::DriverError;

/// All GPIO banks
#[derive(Debug, Default)]
pub struct Stm32Gpio {
    _private: (),
}

impl Stm32Gpio {
    /// GPIO handle
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

fn bank(port: Port) -> Gpio {
    match port {
        Port::A => pac::GPIOA,
        Port::B => pac::GPIOB,
        Port::C => pac::GPIOC,
        Port::H => pac::GPIOH,
    }
}

fn enable_bank(port: Port) {
    pac::RCC.ahbenr().modify(|w| match port {
        Port::A => w.set_gpioaen(true),
        Port::B => w.set_gpioben(true),
        Port::C => w.set_gpiocen(true),
        Port::H => w.set_gpiohen(true),
    });
}

impl GpioDriver for Stm32Gpio {
    fn configure_pin(
        &mut self,
        pin: PinId,
        mode: PinMode,
        pull: Pull,
        initial: Level,
    ) -> Result<(), DriverError> {
        enable_bank(pin.port());
        let gpio = bank(pin.port());
        let n = usize::from(pin.index());

        if mode == PinMode::Output {
            // Latch the level before the driver is enabled
            self.write_pin(pin, initial);
            gpio.otyper().modify(|w| w.set_ot(n, Ot::PUSH_PULL));
        }

        let pupdr = match pull {
            Pull::None => Pupdr::FLOATING,
            Pull::Up => Pupdr::PULL_UP,
            Pull::Down => Pupdr::PULL_DOWN,
        };
        gpio.pupdr().modify(|w| w.set_pupdr(n, pupdr));

        let moder = match mode {
            PinMode::Input => Moder::INPUT,
            PinMode::Output => Moder::OUTPUT,
            PinMode::Analog => Moder::ANALOG,
        };
        gpio.moder().modify(|w| w.set_moder(n, moder));
        Ok(())
    }

    fn write_pin(&mut self, pin: PinId, level: Level) {
        let n = usize::from(pin.index());
        bank(pin.port()).bsrr().write(|w| match level {
            Level::High => w.set_bs(n, true),
            Level::Low => w.set_br(n, true),
        });
    }
}
