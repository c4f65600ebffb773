//! Blocking I2C master

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use gonio_hal::I2cBus;

/// Any `embedded-hal` I2C master as a `gonio-hal` bus
///
/// Used with `embassy_rp::i2c::I2c` in blocking mode.
pub struct I2cMaster<T> {
    bus: T,
}

impl<T: I2c> I2cMaster<T> {
    pub fn new(bus: T) -> Self {
        Self { bus }
    }
}

impl<T: I2c> I2cBus for I2cMaster<T> {
    type Error = ErrorKind;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ErrorKind> {
        self.bus.write(address, data).map_err(|e| e.kind())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), ErrorKind> {
        self.bus.read(address, buf).map_err(|e| e.kind())
    }
}

/// embassy-rp I2C config for a `gonio-hal` bus config
pub fn embassy_config(config: gonio_hal::i2c::I2cConfig) -> embassy_rp::i2c::Config {
    let mut cfg = embassy_rp::i2c::Config::default();
    cfg.frequency = config.frequency;
    cfg
}
