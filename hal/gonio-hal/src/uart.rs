//! Serial byte streams
//!
//! Each laser module sits on its own UART. Transmit is blocking; receive
//! is polled one byte at a time so callers can bound every wait with a
//! [`Deadline`](crate::time::Deadline) instead of blocking on the line.

/// UART transmitter
pub trait UartTx {
    type Error;

    /// Queue all of `data`, blocking while the transmit buffer is full
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Block until everything queued has left the wire
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    type Error;

    /// Read one byte if one is already buffered
    ///
    /// Never blocks: returns `Ok(None)` when the receive buffer is empty.
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Drop up to `max` bytes that are already buffered
    ///
    /// Returns the number of bytes discarded.
    fn discard_pending(&mut self, max: usize) -> Result<usize, Self::Error> {
        let mut dropped = 0;
        while dropped < max {
            match self.try_read_byte()? {
                Some(_) => dropped += 1,
                None => break,
            }
        }
        Ok(dropped)
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::LASER_MODULE
    }
}

impl UartConfig {
    /// Laser rangefinder modules talk 115200 8N1
    pub const LASER_MODULE: Self = Self {
        baudrate: 115200,
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
    };
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}
