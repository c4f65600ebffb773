//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in gonio-core for the rangefinder's components:
//!
//! - Laser rangefinder modules on a UART (ASCII frame protocol)
//! - Angle sensor on an MCP3421 delta-sigma ADC with oversampling
//! - Calibration record on byte-addressable storage

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod rangefinder;
pub mod sensor;
pub mod storage;
