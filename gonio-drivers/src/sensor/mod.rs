//! Angle sensing
//!
//! - [`mcp3421`] - I2C delta-sigma ADC feeding the angle sensor
//! - [`angle`] - oversampling, voltage-to-angle map and zero offset

pub mod angle;
pub mod mcp3421;

pub use angle::{AngleSensorConfig, AngleSensorDriver};
pub use mcp3421::{Gain, Mcp3421, Mcp3421Error, Resolution};
