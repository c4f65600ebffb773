//! Build script for gonio-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml and turns it into a constants module

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceConfig {
    geometry: GeometrySection,
    laser: LaserSection,
    angle: AngleSection,
    battery: BatterySection,
    controller: ControllerSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeometrySection {
    baseline_m: f64,
    front_offset_m: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LaserSection {
    ack_timeout_ms: u32,
    confirm_timeout_ms: u32,
    result_timeout_ms: u32,
    retries: u8,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AngleSection {
    oversampling: u8,
    min_volts: f64,
    max_volts: f64,
    span_deg: f64,
    battery_threshold_volts: f64,
    conversion_timeout_ms: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatterySection {
    divider: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ControllerSection {
    display_interval_ms: u32,
    control_period_ms: u32,
}

fn main() {
    setup_linker();
    let config = load_config();
    validate(&config);
    generate(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse device.toml
fn load_config() -> DeviceConfig {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a device.toml configuration file          ║\n\
            ║  in the gonio-firmware directory.                                ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid device.toml                                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Range-check every value
fn validate(config: &DeviceConfig) {
    let mut errors = Vec::new();

    let g = &config.geometry;
    if !(g.baseline_m > 0.0 && g.baseline_m < 1.0) {
        errors.push("[geometry] baseline_m must be in (0, 1)".to_string());
    }
    if !(g.front_offset_m >= 0.0 && g.front_offset_m < 1.0) {
        errors.push("[geometry] front_offset_m must be in [0, 1)".to_string());
    }

    let l = &config.laser;
    for (name, value) in [
        ("ack_timeout_ms", l.ack_timeout_ms),
        ("confirm_timeout_ms", l.confirm_timeout_ms),
        ("result_timeout_ms", l.result_timeout_ms),
    ] {
        if value == 0 || value > 60_000 {
            errors.push(format!("[laser] {} must be 1-60000", name));
        }
    }
    if l.result_timeout_ms <= l.ack_timeout_ms {
        errors.push("[laser] result_timeout_ms must exceed ack_timeout_ms".to_string());
    }
    if l.retries > 10 {
        errors.push("[laser] retries must be 0-10".to_string());
    }

    let a = &config.angle;
    if a.oversampling == 0 || a.oversampling > 64 {
        errors.push("[angle] oversampling must be 1-64".to_string());
    }
    if !(a.min_volts >= 0.0 && a.min_volts < a.max_volts) {
        errors.push("[angle] need 0 <= min_volts < max_volts".to_string());
    }
    if !(a.span_deg > 0.0 && a.span_deg <= 360.0) {
        errors.push("[angle] span_deg must be in (0, 360]".to_string());
    }
    if !(a.battery_threshold_volts > 0.0) {
        errors.push("[angle] battery_threshold_volts must be positive".to_string());
    }
    if a.conversion_timeout_ms == 0 {
        errors.push("[angle] conversion_timeout_ms must be non-zero".to_string());
    }

    if !(config.battery.divider >= 1.0) {
        errors.push("[battery] divider must be >= 1".to_string());
    }

    let c = &config.controller;
    if c.display_interval_ms == 0 {
        errors.push("[controller] display_interval_ms must be non-zero".to_string());
    }
    if c.control_period_ms == 0 || c.control_period_ms > 1000 {
        errors.push("[controller] control_period_ms must be 1-1000".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid device configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=device.toml validated successfully");
}

/// Write the constants module included by `config.rs`
fn generate(config: &DeviceConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let g = &config.geometry;
    let l = &config.laser;
    let a = &config.angle;

    let source = format!(
        "// Generated from device.toml\n\
         pub const BASELINE_M: f64 = {:?};\n\
         pub const FRONT_OFFSET_M: f64 = {:?};\n\
         pub const ACK_TIMEOUT_MS: u32 = {};\n\
         pub const CONFIRM_TIMEOUT_MS: u32 = {};\n\
         pub const RESULT_TIMEOUT_MS: u32 = {};\n\
         pub const COMM_RETRIES: u8 = {};\n\
         pub const OVERSAMPLING: u8 = {};\n\
         pub const ANGLE_MIN_VOLTS: f64 = {:?};\n\
         pub const ANGLE_MAX_VOLTS: f64 = {:?};\n\
         pub const ANGLE_SPAN_DEG: f64 = {:?};\n\
         pub const BATTERY_THRESHOLD_VOLTS: f64 = {:?};\n\
         pub const CONVERSION_TIMEOUT_MS: u32 = {};\n\
         pub const BATTERY_DIVIDER: f64 = {:?};\n\
         pub const DISPLAY_INTERVAL_MS: u32 = {};\n\
         pub const CONTROL_PERIOD_MS: u32 = {};\n",
        g.baseline_m,
        g.front_offset_m,
        l.ack_timeout_ms,
        l.confirm_timeout_ms,
        l.result_timeout_ms,
        l.retries,
        a.oversampling,
        a.min_volts,
        a.max_volts,
        a.span_deg,
        a.battery_threshold_volts,
        a.conversion_timeout_ms,
        config.battery.divider,
        config.controller.display_interval_ms,
        config.controller.control_period_ms,
    );

    fs::write(out_dir.join("device_config.rs"), source).unwrap();
}
