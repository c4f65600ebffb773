//! Component traits
//!
//! These traits define the interface between the measurement controller
//! and the driver implementations.

pub mod angle;
pub mod rangefinder;
pub mod storage;

pub use angle::{AngleSample, AngleSensor, SensorError};
pub use rangefinder::{LinkState, ModuleError, Rangefinder, RangefinderError, Side};
pub use storage::{CalibrationStorage, StorageError};
