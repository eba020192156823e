//! Diagnostic UART on USART1 (PA9 / PA10)

use embassy_stm32::peripherals::{PA10, PA9, USART1};
use embassy_stm32::usart::{self, BufferedUart};
use embassy_stm32::{bind_interrupts, peripherals};

use crate::hal::uart::{DataBits, FlowControl, Parity, StopBits, UartConfig, UartDriver, UartFifo};
use crate::hal::DriverError;

bind_interrupts!(struct Irqs {
    USART1 => usart::BufferedInterruptHandler<peripherals::USART1>;
});

/// USART1 with interrupt-driven ring buffers
pub struct Stm32Uart {
    pins: Option<(USART1, PA10, PA9)>,
    uart: Option<BufferedUart<'static>>,
}

impl Stm32Uart {
    /// Hold the peripheral until `init`
    #[must_use]
    pub fn new(usart: USART1, rx: PA10, tx: PA9) -> Self {
        Self {
            pins: Some((usart, rx, tx)),
            uart: None,
        }
    }

    /// Running UART, `None` before `init`
    pub fn port(&mut self) -> Option<&mut BufferedUart<'static>> {
        self.uart.as_mut()
    }
}

fn embassy_config(config: UartConfig) -> Result<usart::Config, DriverError> {
    if config.flow_control != FlowControl::None {
        return Err(DriverError::InvalidConfig);
    }

    let mut cfg = usart::Config::default();
    cfg.baudrate = config.baud_rate;
    cfg.data_bits = match config.data_bits {
        DataBits::Seven => usart::DataBits::DataBits7,
        DataBits::Eight => usart::DataBits::DataBits8,
        DataBits::Nine => usart::DataBits::DataBits9,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => usart::StopBits::STOP1,
        StopBits::Two => usart::StopBits::STOP2,
    };
    cfg.parity = match config.parity {
        Parity::None => usart::Parity::ParityNone,
        Parity::Even => usart::Parity::ParityEven,
        Parity::Odd => usart::Parity::ParityOdd,
    };
    Ok(cfg)
}

impl UartDriver for Stm32Uart {
    fn init(&mut self, config: UartConfig, fifo: UartFifo) -> Result<(), DriverError> {
        let cfg = embassy_config(config)?;
        let (usart, rx, tx) = self.pins.take().ok_or(DriverError::Busy)?;
        let UartFifo { tx: tx_buf, rx: rx_buf } = fifo;

        let uart = BufferedUart::new(usart, Irqs, rx, tx, tx_buf, rx_buf, cfg)
            .map_err(|_| DriverError::InvalidConfig)?;
        self.uart = Some(uart);
        Ok(())
    }
}
