//! UART Abstractions
//!
//! Line settings and the statically allocated ring buffers handed to the
//! diagnostic UART driver.

use super::DriverError;
use crate::config::{UART_BAUD_RATE, UART_FIFO_RX_SIZE, UART_FIFO_TX_SIZE};

/// Number of data bits per frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DataBits {
    /// 7 data bits
    Seven,
    /// 8 data bits
    #[default]
    Eight,
    /// 9 data bits
    Nine,
}

/// Number of stop bits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StopBits {
    /// One stop bit
    #[default]
    One,
    /// Two stop bits
    Two,
}

/// Parity mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Parity {
    /// No parity
    #[default]
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Hardware flow control
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FlowControl {
    /// No flow control
    #[default]
    None,
    /// RTS/CTS handshake
    RtsCts,
}

/// UART line configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UartConfig {
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits
    pub data_bits: DataBits,
    /// Stop bits
    pub stop_bits: StopBits,
    /// Parity
    pub parity: Parity,
    /// Flow control
    pub flow_control: FlowControl,
}

impl UartConfig {
    /// Diagnostic console settings: 115200 8N1, no flow control
    #[must_use]
    pub const fn diagnostic() -> Self {
        Self {
            baud_rate: UART_BAUD_RATE,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::diagnostic()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for UartConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "UartConfig({} baud)", self.baud_rate);
    }
}

/// Transmit and receive ring buffers owned by the UART
pub struct UartFifo {
    /// Transmit buffer
    pub tx: &'static mut [u8; UART_FIFO_TX_SIZE],
    /// Receive buffer
    pub rx: &'static mut [u8; UART_FIFO_RX_SIZE],
}

impl UartFifo {
    /// Bundle two static buffers
    #[must_use]
    pub fn new(
        tx: &'static mut [u8; UART_FIFO_TX_SIZE],
        rx: &'static mut [u8; UART_FIFO_RX_SIZE],
    ) -> Self {
        Self { tx, rx }
    }

    /// Transmit capacity in bytes
    #[must_use]
    pub fn tx_capacity(&self) -> usize {
        self.tx.len()
    }

    /// Receive capacity in bytes
    #[must_use]
    pub fn rx_capacity(&self) -> usize {
        self.rx.len()
    }
}

impl core::fmt::Debug for UartFifo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UartFifo")
            .field("tx", &self.tx.len())
            .field("rx", &self.rx.len())
            .finish()
    }
}

/// Buffered diagnostic UART
pub trait UartDriver {
    /// Configure the port and take ownership of its ring buffers
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is rejected.
    fn init(&mut self, config: UartConfig, fifo: UartFifo) -> Result<(), DriverError>;
}
