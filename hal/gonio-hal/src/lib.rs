//! Gonio Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the rangefinder
//! drivers are written against. Chip-specific HALs implement them, and
//! host tests implement them with scripted mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (gonio-firmware)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  gonio-core / gonio-drivers             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  gonio-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ gonio-hal-rp2040│
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`], [`gpio::EdgeInput`] - Button inputs
//! - [`uart::UartTx`], [`uart::UartRx`] - Laser module byte streams
//! - [`i2c::I2cBus`] - I2C bus for the angle ADC
//! - [`adc::AdcReader`] - Signed-code analog reads
//! - [`eeprom::ByteStore`] - Byte-addressable persistent storage
//! - [`time::Clock`] - Monotonic millisecond clock and deadlines

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod eeprom;
pub mod gpio;
pub mod i2c;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use adc::{AdcReader, AdcReading};
pub use eeprom::{write_through, ByteStore, StoreError};
pub use gpio::{Edge, EdgeInput, InputPin};
pub use i2c::I2cBus;
pub use time::{Clock, Deadline};
pub use uart::{UartRx, UartTx};
