//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the node hardware and the
//! runtime [`BoardConfig`] that selects between board variants.
//! All pin mappings, clock parameters and battery thresholds are centralized here.

/// HSE crystal frequency (12 MHz)
pub const HSE_FREQUENCY_HZ: u32 = 12_000_000;

/// PLL multiplier applied to HSE
pub const PLL_MULTIPLIER: u8 = 6;

/// PLL output divider
pub const PLL_DIVIDER: u8 = 3;

/// System clock at full speed (HSE * 6 / 3 = 24 MHz)
pub const SYSTEM_CLOCK_HZ: u32 = HSE_FREQUENCY_HZ / PLL_DIVIDER as u32 * PLL_MULTIPLIER as u32;

/// Flash wait states needed at full speed
pub const FULL_SPEED_FLASH_LATENCY: u8 = 1;

/// Polls of the HSE ready bit before giving up
pub const HSE_STARTUP_POLLS: u32 = 100_000;

/// Polls of the LSE ready bit before giving up
pub const LSE_STARTUP_POLLS: u32 = 500_000;

/// Polls of the PLL lock and clock switch status before giving up
pub const PLL_LOCK_POLLS: u32 = 100_000;

/// UART transmit FIFO size in bytes
pub const UART_FIFO_TX_SIZE: usize = 1024;

/// UART receive FIFO size in bytes
pub const UART_FIFO_RX_SIZE: usize = 1024;

/// Diagnostic UART baud rate
pub const UART_BAUD_RATE: u32 = 115_200;

/// Length of the one-shot wakeup calibration timer
pub const CALIBRATION_INTERVAL_MS: u32 = 1000;

/// Internal bandgap reference voltage
pub const ADC_VREF_BANDGAP_MV: u32 = 1224;

/// Full-scale ADC code at 12-bit resolution
pub const ADC_MAX_VALUE_12BIT: u16 = 4095;

/// Full-scale ADC code at 10-bit resolution (encoder variant)
pub const ADC_MAX_VALUE_10BIT: u16 = 1023;

/// Battery voltage at or above which the level reports full
pub const BATTERY_MAX_LEVEL_MV: u32 = 3000;

/// Battery voltage at or below which the level reports critical
pub const BATTERY_MIN_LEVEL_MV: u32 = 2400;

/// Battery voltage at or below which the level reports shutdown
pub const BATTERY_SHUTDOWN_LEVEL_MV: u32 = 2300;

/// Potentiometer code reported as 100%
pub const POTI_MAX_LEVEL: u16 = 900;

/// Potentiometer code reported as 0%
pub const POTI_MIN_LEVEL: u16 = 10;

/// Independent watchdog timeout
pub const WATCHDOG_TIMEOUT_US: u32 = 20_000_000;

/// SPI clock for the radio front end
pub const RADIO_SPI_FREQUENCY_HZ: u32 = 10_000_000;

/// Factory unique-ID register addresses (STM32L1 category 1/2)
pub mod device_id {
    //! Addresses of the three 32-bit unique-ID words

    /// First ID word
    pub const ID1: usize = 0x1FF8_0050;

    /// Second ID word
    pub const ID2: usize = 0x1FF8_0054;

    /// Third ID word
    pub const ID3: usize = 0x1FF8_0064;
}

/// ADC channel assignments
pub mod adc_channels {
    //! ADC input channels

    /// Potentiometer / analog alarm input (PA3)
    pub const POTI: u8 = 3;

    /// Internal reference voltage
    pub const VREFINT: u8 = 17;
}

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    use crate::hal::gpio::{PinId, Port};

    /// Indicator LED 1 (battery / status)
    pub const LED_1: PinId = PinId::new(Port::B, 2);

    /// Indicator LED 2
    pub const LED_2: PinId = PinId::new(Port::A, 8);

    /// Indicator LED 3
    pub const LED_3: PinId = PinId::new(Port::B, 14);

    /// Indicator LED 4
    pub const LED_4: PinId = PinId::new(Port::B, 15);

    /// All indicator LEDs in initialization order
    pub const LEDS: [PinId; 4] = [LED_1, LED_2, LED_3, LED_4];

    /// Diagnostic UART TX
    pub const UART_TX: PinId = PinId::new(Port::A, 9);

    /// Diagnostic UART RX
    pub const UART_RX: PinId = PinId::new(Port::A, 10);

    /// Potentiometer analog input
    pub const POTI: PinId = PinId::new(Port::A, 3);

    /// Radio SPI MOSI
    pub const RADIO_MOSI: PinId = PinId::new(Port::A, 7);

    /// Radio SPI MISO
    pub const RADIO_MISO: PinId = PinId::new(Port::A, 6);

    /// Radio SPI SCLK
    pub const RADIO_SCLK: PinId = PinId::new(Port::A, 5);

    /// Radio SPI chip select
    pub const RADIO_NSS: PinId = PinId::new(Port::B, 0);

    /// Radio reset line
    pub const RADIO_RESET: PinId = PinId::new(Port::A, 2);

    /// Radio DIO0 (TX/RX done)
    pub const RADIO_DIO_0: PinId = PinId::new(Port::B, 1);

    /// Radio DIO1 (RX timeout)
    pub const RADIO_DIO_1: PinId = PinId::new(Port::B, 10);

    /// Radio DIO2
    pub const RADIO_DIO_2: PinId = PinId::new(Port::B, 11);

    /// Radio TCXO power control
    pub const RADIO_TCXO_POWER: PinId = PinId::new(Port::A, 1);

    /// Radio debug pin mirroring TX activity
    pub const RADIO_DBG_TX: PinId = PinId::new(Port::B, 13);

    /// Radio debug pin mirroring RX activity
    pub const RADIO_DBG_RX: PinId = PinId::new(Port::B, 12);

    /// HSE crystal input
    pub const OSC_HSE_IN: PinId = PinId::new(Port::H, 0);

    /// HSE crystal output
    pub const OSC_HSE_OUT: PinId = PinId::new(Port::H, 1);

    /// LSE crystal input
    pub const OSC_LSE_IN: PinId = PinId::new(Port::C, 14);

    /// LSE crystal output
    pub const OSC_LSE_OUT: PinId = PinId::new(Port::C, 15);

    /// USB D- (unused when running on battery)
    pub const USB_DM: PinId = PinId::new(Port::A, 11);

    /// USB D+ (unused when running on battery)
    pub const USB_DP: PinId = PinId::new(Port::A, 12);

    /// JTAG TMS / SWDIO
    pub const JTAG_TMS: PinId = PinId::new(Port::A, 13);

    /// JTAG TCK / SWCLK
    pub const JTAG_TCK: PinId = PinId::new(Port::A, 14);

    /// JTAG TDI
    pub const JTAG_TDI: PinId = PinId::new(Port::A, 15);

    /// JTAG TDO / SWO
    pub const JTAG_TDO: PinId = PinId::new(Port::B, 3);

    /// JTAG NRST
    pub const JTAG_NRST: PinId = PinId::new(Port::B, 4);

    /// JTAG pins floated when no debugger is attached
    pub const JTAG: [PinId; 5] = [JTAG_TMS, JTAG_TCK, JTAG_TDI, JTAG_TDO, JTAG_NRST];
}

/// Board variant, resolved once at start-up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    /// LED 1 doubles as status indicator and is driven during early boot
    pub indicator_led: bool,
    /// Rotary-encoder variant: 10-bit ADC, raw potentiometer readings
    pub encoder: bool,
    /// Keep the debug port alive in low-power modes
    pub debugger: bool,
}

impl BoardConfig {
    /// Default board: indicator LED fitted, no encoder, no debugger
    #[must_use]
    pub const fn new() -> Self {
        Self {
            indicator_led: true,
            encoder: false,
            debugger: false,
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BoardConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "BoardConfig(led={}, encoder={}, debugger={})",
            self.indicator_led,
            self.encoder,
            self.debugger
        );
    }
}
