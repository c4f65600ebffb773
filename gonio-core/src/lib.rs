//! Board-agnostic core logic for the goniometric rangefinder firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Component traits (rangefinder, angle sensor, calibration storage)
//! - Device state machine and the measurement controller driving it
//! - Calibration record and its persisted encoding
//! - Display units and triangulation geometry
//! - Interrupt-safe button debounce
//! - Battery gauge

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod battery;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod input;
pub mod state;
pub mod traits;
