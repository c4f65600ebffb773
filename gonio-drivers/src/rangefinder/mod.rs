//! Laser rangefinder modules
//!
//! - [`protocol`] - frame assembly and reply classification
//! - [`driver`] - blocking command/reply exchanges with timeouts and retries

pub mod driver;
pub mod protocol;

pub use driver::{LaserRangefinder, RangefinderTimeouts};
