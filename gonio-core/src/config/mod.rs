//! Configuration types
//!
//! User calibration persisted across power cycles, and the display units
//! it selects between.

pub mod calibration;
pub mod units;

pub use calibration::*;
pub use units::DisplayUnit;
