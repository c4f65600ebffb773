//! Calibration persistence

pub mod calibration;

pub use calibration::EepromCalibrationStore;
