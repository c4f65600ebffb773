//! Laser module UART
//!
//! Wraps an embassy-rp buffered UART. Received bytes land in the
//! interrupt-fed ring buffer, so polling it never blocks.

use embedded_io::{Error as _, ErrorKind, Read, ReadReady, Write};
use gonio_hal::{UartRx, UartTx};

/// Buffered UART implementing the `gonio-hal` byte stream traits
pub struct LaserUart<T> {
    io: T,
}

impl<T> LaserUart<T> {
    pub fn new(io: T) -> Self {
        Self { io }
    }
}

impl<T: Write> UartTx for LaserUart<T> {
    type Error = ErrorKind;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), ErrorKind> {
        self.io.write_all(data).map_err(|e| e.kind())
    }

    fn flush(&mut self) -> Result<(), ErrorKind> {
        self.io.flush().map_err(|e| e.kind())
    }
}

impl<T: Read + ReadReady> UartRx for LaserUart<T> {
    type Error = ErrorKind;

    fn try_read_byte(&mut self) -> Result<Option<u8>, ErrorKind> {
        if !self.io.read_ready().map_err(|e| e.kind())? {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        match self.io.read(&mut byte).map_err(|e| e.kind())? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

/// embassy-rp UART config for a `gonio-hal` line config
pub fn embassy_config(config: gonio_hal::uart::UartConfig) -> embassy_rp::uart::Config {
    use embassy_rp::uart;
    use gonio_hal::uart::{DataBits, Parity, StopBits};

    let mut cfg = uart::Config::default();
    cfg.baudrate = config.baudrate;
    cfg.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    cfg.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    cfg
}
