//! I2C master abstraction
//!
//! Only plain transfers are needed: the angle ADC takes a one-byte
//! configuration write and answers conversion reads with data followed by
//! its configuration byte, so no repeated-start transactions are used.

/// Blocking I2C master
pub trait I2cBus {
    /// Bus error (NACK, arbitration loss, ...)
    type Error;

    /// Write `data` to the 7-bit `address`
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Fill `buf` from the 7-bit `address`
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// Bus clock setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cConfig {
    pub frequency: u32,
}

impl I2cConfig {
    /// 100 kHz
    pub const STANDARD: Self = Self { frequency: 100_000 };
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}
