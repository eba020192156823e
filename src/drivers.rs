//! STM32L1 Drivers
//!
//! Implementations of the `hal` traits for the STM32L151 and the SX1272
//! front end. This is the only module that touches registers directly.

#![allow(unsafe_code)]

pub mod adc;
pub mod gpio;
pub mod pwr;
pub mod radio;
pub mod rcc;
pub mod rtc;
pub mod timer;
pub mod uart;
pub mod watchdog;

use embassy_stm32::rcc::{
    AHBPrescaler, APBPrescaler, Hse, HseMode, LsConfig, Pll, PllDiv, PllMul, PllSource, Sysclk,
    VoltageScale,
};
use embassy_stm32::time::Hertz;
use static_cell::StaticCell;

use crate::board::BoardParts;
use crate::config::{
    device_id, BoardConfig, HSE_FREQUENCY_HZ, PLL_DIVIDER, PLL_MULTIPLIER, UART_FIFO_RX_SIZE,
    UART_FIFO_TX_SIZE,
};
use crate::hal::{Platform, TimerFired, UartFifo};
use crate::types::{DeviceIdWords, PowerSource};

pub use adc::Stm32Adc;
pub use gpio::Stm32Gpio;
pub use pwr::Stm32Power;
pub use radio::Sx1272FrontEnd;
pub use rcc::Stm32ClockTree;
pub use rtc::Stm32Rtc;
pub use timer::SysTickTimer;
pub use uart::Stm32Uart;
pub use watchdog::Stm32Watchdog;

/// The node's MCU and radio
pub struct Stm32Platform;

impl Platform for Stm32Platform {
    type Clock = Stm32ClockTree;
    type Gpio = Stm32Gpio;
    type Adc = Stm32Adc;
    type Uart = Stm32Uart;
    type Radio = Sx1272FrontEnd;
    type Rtc = Stm32Rtc;
    type Timer = SysTickTimer;
    type Watchdog = Stm32Watchdog;
    type Power = Stm32Power;
}

static UART_TX_BUF: StaticCell<[u8; UART_FIFO_TX_SIZE]> = StaticCell::new();
static UART_RX_BUF: StaticCell<[u8; UART_FIFO_RX_SIZE]> = StaticCell::new();
static CALIBRATION_FIRED: TimerFired = TimerFired::new();

/// Embassy start-up configuration matching the FullSpeed clock profile
///
/// Embassy derives the UART baud divisors and the time driver tick from the
/// frequencies it configures here, so they must equal what the clock profile
/// manager programs: HSE 12 MHz, PLL x6 / 3, 24 MHz on all buses, LSE for
/// the RTC.
#[must_use]
pub fn embassy_config() -> embassy_stm32::Config {
    const _: () = assert!(PLL_MULTIPLIER == 6 && PLL_DIVIDER == 3);

    let mut config = embassy_stm32::Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(HSE_FREQUENCY_HZ),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll = Some(Pll {
        source: PllSource::HSE,
        mul: PllMul::MUL6,
        div: PllDiv::DIV3,
    });
    config.rcc.sys = Sysclk::PLL1_R;
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV1;
    config.rcc.apb2_pre = APBPrescaler::DIV1;
    config.rcc.voltage_scale = VoltageScale::RANGE1;
    config.rcc.ls = LsConfig::default_lse();
    config
}

/// Read the three factory identifier words
#[must_use]
pub fn read_device_id() -> DeviceIdWords {
    // SAFETY: fixed, always-readable system memory addresses
    let read = |addr: usize| unsafe { core::ptr::read_volatile(addr as *const u32) };
    DeviceIdWords::new(read(device_id::ID1), read(device_id::ID2), read(device_id::ID3))
}

/// Power source of this board; there is no USB sense line
#[must_use]
pub const fn power_source() -> PowerSource {
    PowerSource::Battery
}

/// Build the board parts from the embassy peripheral singletons
///
/// Must only be called once; the UART buffers are static.
#[must_use]
pub fn take(p: embassy_stm32::Peripherals, config: BoardConfig) -> BoardParts<Stm32Platform> {
    let uart_fifo = UartFifo::new(
        UART_TX_BUF.init([0; UART_FIFO_TX_SIZE]),
        UART_RX_BUF.init([0; UART_FIFO_RX_SIZE]),
    );

    BoardParts {
        clock: Stm32ClockTree::new(),
        gpio: Stm32Gpio::new(),
        adc: Stm32Adc::new(),
        uart: Stm32Uart::new(p.USART1, p.PA10, p.PA9),
        radio: Sx1272FrontEnd::new(),
        rtc: Stm32Rtc::new(),
        timer: SysTickTimer::new(),
        watchdog: Stm32Watchdog::new(p.IWDG),
        power: Stm32Power::new(),
        uart_fifo,
        device_id: read_device_id(),
        source: power_source(),
        calibration_fired: &CALIBRATION_FIRED,
        config,
    }
}
