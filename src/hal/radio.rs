//! Radio Front-End Abstractions
//!
//! SPI bus and the SX1272's control lines (reset, DIO interrupts,
//! debug mirrors and TCXO supply).

use super::DriverError;

/// SPI bus plus radio I/O lines
pub trait RadioFrontEnd {
    /// Bring up the SPI bus
    ///
    /// A bus that is already running is left as is and reported as success.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus cannot be configured.
    fn spi_init(&mut self) -> Result<(), DriverError>;

    /// Release the SPI bus and float its pins
    fn spi_deinit(&mut self);

    /// Configure reset and DIO lines
    ///
    /// # Errors
    ///
    /// Returns an error if a line cannot be configured.
    fn io_init(&mut self) -> Result<(), DriverError>;

    /// Float reset and DIO lines
    fn io_deinit(&mut self);

    /// Configure the TX/RX activity mirror pins
    ///
    /// # Errors
    ///
    /// Returns an error if a pin cannot be configured.
    fn debug_io_init(&mut self) -> Result<(), DriverError>;

    /// Configure the TCXO supply control
    ///
    /// # Errors
    ///
    /// Returns an error if the control pin cannot be configured.
    fn tcxo_init(&mut self) -> Result<(), DriverError>;
}
