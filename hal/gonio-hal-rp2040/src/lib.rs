//! RP2040-specific HAL for the rangefinder firmware
//!
//! This crate provides RP2040 implementations of the shared `gonio-hal`
//! traits on top of embassy-rp peripherals:
//!
//! - Buffered UART byte streams for the laser modules
//! - Blocking I2C master for the angle ADC
//! - On-chip ADC channel for the battery divider
//! - EEPROM emulation in the last flash sector
//! - Edge-waiting button inputs
//! - Embassy time as the millisecond clock

#![no_std]

pub mod adc;
pub mod flash;
pub mod gpio;
pub mod i2c;
pub mod time;
pub mod uart;

pub use adc::BatteryAdc;
pub use flash::FlashEeprom;
pub use gpio::ButtonInput;
pub use i2c::I2cMaster;
pub use time::EmbassyClock;
pub use uart::LaserUart;
