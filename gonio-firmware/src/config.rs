//! Board configuration
//!
//! Constants come from device.toml via build.rs; the helpers below turn
//! them into the runtime config structs of the core and driver crates.

use gonio_core::controller::ControllerConfig;
use gonio_core::geometry::Geometry;
use gonio_drivers::rangefinder::RangefinderTimeouts;
use gonio_drivers::sensor::AngleSensorConfig;

include!(concat!(env!("OUT_DIR"), "/device_config.rs"));

pub fn controller_config() -> ControllerConfig {
    ControllerConfig {
        display_interval_ms: DISPLAY_INTERVAL_MS,
        geometry: Geometry {
            baseline_m: BASELINE_M,
            front_offset_m: FRONT_OFFSET_M,
        },
    }
}

pub fn rangefinder_timeouts() -> RangefinderTimeouts {
    RangefinderTimeouts {
        ack_ms: ACK_TIMEOUT_MS,
        confirm_ms: CONFIRM_TIMEOUT_MS,
        result_ms: RESULT_TIMEOUT_MS,
        retries: COMM_RETRIES,
    }
}

pub fn angle_sensor_config() -> AngleSensorConfig {
    AngleSensorConfig {
        oversampling: OVERSAMPLING,
        min_volts: ANGLE_MIN_VOLTS,
        max_volts: ANGLE_MAX_VOLTS,
        span_deg: ANGLE_SPAN_DEG,
        battery_threshold_volts: BATTERY_THRESHOLD_VOLTS,
        battery_divider: BATTERY_DIVIDER,
    }
}
