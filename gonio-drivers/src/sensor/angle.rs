//! Arm angle sensor
//!
//! A ratiometric rotary sensor behind a 0.4 divider, read through a
//! signed-code ADC. The sensor swings 0.08 V..1.92 V at the ADC input over
//! 90°, but only while the battery is healthy: at or below 5.125 V its
//! top end sags with the supply and the map is rescaled to follow it.

use gonio_core::traits::{AngleSample, AngleSensor, SensorError};
use gonio_hal::AdcReader;

/// Largest oversampling window
pub const MAX_OVERSAMPLING: usize = 64;

/// Angle acquisition settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AngleSensorConfig {
    /// Conversions averaged per sample, 1..=[`MAX_OVERSAMPLING`]
    pub oversampling: u8,
    /// ADC input voltage at 0°
    pub min_volts: f64,
    /// ADC input voltage at full span with a healthy battery
    pub max_volts: f64,
    /// Angle covered between `min_volts` and the sensor maximum
    pub span_deg: f64,
    /// Battery voltage above which the sensor reaches `max_volts`
    pub battery_threshold_volts: f64,
    /// Battery volts per volt at the battery ADC pin
    pub battery_divider: f64,
}

impl Default for AngleSensorConfig {
    fn default() -> Self {
        Self {
            oversampling: 4,
            min_volts: 0.08,
            max_volts: 1.92,
            span_deg: 90.0,
            battery_threshold_volts: 5.125,
            battery_divider: 2.0,
        }
    }
}

/// Sensor output at full span for a given battery voltage
pub fn sensor_max_volts(battery_volts: f64, config: &AngleSensorConfig) -> f64 {
    if battery_volts > config.battery_threshold_volts {
        config.max_volts
    } else {
        0.383 * battery_volts - 0.064
    }
}

/// Linear map from ADC input voltage to degrees
pub fn volts_to_degrees(volts: f64, sensor_max: f64, config: &AngleSensorConfig) -> f64 {
    let slope = config.span_deg / (sensor_max - config.min_volts);
    slope * (volts - config.min_volts)
}

/// Mean of `n` codes summing to `sum`, rounded half away from zero
pub fn rounded_mean(sum: i64, n: u32) -> i32 {
    if n <= 1 {
        return sum as i32;
    }
    let n = n as i64;
    let half = n / 2;
    let mean = if sum >= 0 {
        (sum + half) / n
    } else {
        (sum - half) / n
    };
    mean as i32
}

/// Oversampled code of a window of raw codes
pub fn oversample(codes: &[i32]) -> i32 {
    let sum: i64 = codes.iter().map(|&c| c as i64).sum();
    rounded_mean(sum, codes.len() as u32)
}

/// Angle sensor on a signed-code ADC with a battery channel
pub struct AngleSensorDriver<A, B> {
    adc: A,
    battery: B,
    config: AngleSensorConfig,
    offset_deg: f64,
}

impl<A, B> AngleSensorDriver<A, B>
where
    A: AdcReader,
    A::Error: Into<SensorError>,
    B: AdcReader,
{
    pub fn new(adc: A, battery: B, config: AngleSensorConfig) -> Self {
        Self {
            adc,
            battery,
            config,
            offset_deg: 0.0,
        }
    }

    /// Battery voltage from the battery channel
    pub fn battery_volts(&mut self) -> Result<f64, SensorError> {
        let reading = self.battery.read().map_err(|_| SensorError::Battery)?;
        Ok(reading.volts() * self.config.battery_divider)
    }
}

impl<A, B> AngleSensor for AngleSensorDriver<A, B>
where
    A: AdcReader,
    A::Error: Into<SensorError>,
    B: AdcReader,
{
    fn sample(&mut self) -> Result<AngleSample, SensorError> {
        let battery_volts = self.battery_volts()?;

        let sensor_max = sensor_max_volts(battery_volts, &self.config);
        if sensor_max <= self.config.min_volts {
            #[cfg(feature = "defmt")]
            defmt::warn!("Battery at {} V leaves no sensor span", battery_volts);
            return Err(SensorError::Battery);
        }

        let window = (self.config.oversampling as usize).clamp(1, MAX_OVERSAMPLING);
        let mut codes = [0i32; MAX_OVERSAMPLING];
        let mut last = None;
        for code in codes.iter_mut().take(window) {
            let reading = self.adc.read().map_err(Into::<SensorError>::into)?;
            *code = reading.code;
            last = Some(reading);
        }
        let Some(reading) = last else {
            return Err(SensorError::Bus);
        };

        let raw_code = oversample(&codes[..window]);
        let volts = raw_code as f64 * reading.lsb_volts;
        let mapped_deg = volts_to_degrees(volts, sensor_max, &self.config);

        let angle = mapped_deg + self.offset_deg;
        let angle_deg = if angle > 0.0 { angle } else { 0.0 };

        Ok(AngleSample {
            raw_code,
            resolution_bits: reading.resolution_bits,
            lsb_volts: reading.lsb_volts,
            volts,
            mapped_deg,
            angle_deg,
            battery_volts,
            offset_deg: self.offset_deg,
        })
    }

    fn offset(&self) -> f64 {
        self.offset_deg
    }

    fn set_offset(&mut self, offset_deg: f64) {
        self.offset_deg = offset_deg;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gonio_hal::AdcReading;
    use proptest::prelude::*;

    /// Cycles through a fixed list of codes
    struct ScriptedAdc {
        codes: [i32; 4],
        next: usize,
        lsb_volts: f64,
        fail: bool,
    }

    impl ScriptedAdc {
        fn constant(code: i32, lsb_volts: f64) -> Self {
            Self {
                codes: [code; 4],
                next: 0,
                lsb_volts,
                fail: false,
            }
        }
    }

    impl AdcReader for ScriptedAdc {
        type Error = SensorError;

        fn read(&mut self) -> Result<AdcReading, SensorError> {
            if self.fail {
                return Err(SensorError::Bus);
            }
            let code = self.codes[self.next % self.codes.len()];
            self.next += 1;
            Ok(AdcReading {
                code,
                resolution_bits: 16,
                lsb_volts: self.lsb_volts,
            })
        }
    }

    const LSB_16: f64 = 0.000_062_5;

    /// Battery channel reading `volts` at the battery (after the divider)
    fn battery(volts: f64) -> ScriptedAdc {
        ScriptedAdc::constant((volts / 2.0 / 0.001).round() as i32, 0.001)
    }

    fn sensor(code: i32, battery_volts: f64) -> AngleSensorDriver<ScriptedAdc, ScriptedAdc> {
        AngleSensorDriver::new(
            ScriptedAdc::constant(code, LSB_16),
            battery(battery_volts),
            AngleSensorConfig::default(),
        )
    }

    #[test]
    fn test_oversample_rounding() {
        assert_eq!(oversample(&[1, 1, 1, 2]), 1); // 1.25
        assert_eq!(oversample(&[1, 1, 2, 2]), 2); // 1.5
        assert_eq!(oversample(&[-1, -1, -2, -2]), -2); // -1.5
        assert_eq!(oversample(&[-1, -1, -1, -2]), -1); // -1.25
        assert_eq!(oversample(&[7]), 7);
    }

    #[test]
    fn test_sensor_max_switches_at_threshold() {
        let cfg = AngleSensorConfig::default();
        assert_eq!(sensor_max_volts(5.2, &cfg), 1.92);
        assert_eq!(sensor_max_volts(5.125, &cfg), 0.383 * 5.125 - 0.064);
        assert_eq!(sensor_max_volts(5.0, &cfg), 0.383 * 5.0 - 0.064);
    }

    #[test]
    fn test_endpoints_map_to_span() {
        let cfg = AngleSensorConfig::default();
        assert!(volts_to_degrees(0.08, 1.92, &cfg).abs() < 1e-12);
        assert!((volts_to_degrees(1.92, 1.92, &cfg) - 90.0).abs() < 1e-12);
        assert!((volts_to_degrees(1.0, 1.92, &cfg) - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample() {
        // 1.0 V at 62.5 µV/LSB with a healthy battery
        let mut s = sensor(16_000, 6.0);
        let sample = s.sample().unwrap();

        assert_eq!(sample.raw_code, 16_000);
        assert_eq!(sample.resolution_bits, 16);
        assert!((sample.volts - 1.0).abs() < 1e-12);
        assert!((sample.mapped_deg - 45.0).abs() < 1e-9);
        assert!((sample.battery_volts - 6.0).abs() < 1e-9);
        assert_eq!(sample.offset_deg, 0.0);
    }

    #[test]
    fn test_low_battery_rescales() {
        let mut s = sensor(16_000, 5.0);
        let sample = s.sample().unwrap();
        let max = 0.383 * 5.0 - 0.064;
        let expected = 90.0 / (max - 0.08) * (1.0 - 0.08);
        assert!((sample.mapped_deg - expected).abs() < 1e-6);
    }

    #[test]
    fn test_oversampling_window() {
        let mut s = AngleSensorDriver::new(
            ScriptedAdc {
                codes: [100, 101, 101, 101],
                next: 0,
                lsb_volts: LSB_16,
                fail: false,
            },
            battery(6.0),
            AngleSensorConfig::default(),
        );
        // 403 / 4 = 100.75
        assert_eq!(s.sample().unwrap().raw_code, 101);
        assert_eq!(s.adc.next, 4);
    }

    #[test]
    fn test_flat_battery_is_rejected() {
        // 0.3 V puts the sensor maximum below the 0° voltage
        let mut s = sensor(16_000, 0.3);
        assert_eq!(s.sample(), Err(SensorError::Battery));
        assert_eq!(s.adc.next, 0);
    }

    #[test]
    fn test_zero_then_read_is_zero() {
        let mut s = sensor(20_000, 6.0);
        let before = s.sample().unwrap();
        assert!(before.angle_deg > 0.0);

        let offset = s.zero().unwrap();
        assert_eq!(offset, -before.mapped_deg);
        assert_eq!(s.offset(), offset);

        let after = s.sample().unwrap();
        assert!(after.angle_deg.abs() < 1e-9);
        assert_eq!(after.offset_deg, offset);
    }

    #[test]
    fn test_angle_clamped_at_zero() {
        // Below the 0° voltage
        let mut s = sensor(100, 6.0);
        let sample = s.sample().unwrap();
        assert!(sample.mapped_deg < 0.0);
        assert_eq!(sample.angle_deg, 0.0);
    }

    #[test]
    fn test_adc_failure_surfaces() {
        let mut s = sensor(16_000, 6.0);
        s.adc.fail = true;
        assert_eq!(s.sample(), Err(SensorError::Bus));

        let mut s = sensor(16_000, 6.0);
        s.battery.fail = true;
        assert_eq!(s.sample(), Err(SensorError::Battery));
    }

    proptest! {
        #[test]
        fn prop_oversample_matches_rounded_mean(codes in proptest::array::uniform4(-131_072i32..131_072)) {
            let sum: i64 = codes.iter().map(|&c| c as i64).sum();
            let expected = (sum as f64 / 4.0).round() as i32;
            prop_assert_eq!(oversample(&codes), expected);
        }

        #[test]
        fn prop_sensor_max(battery in 3.0f64..8.0) {
            let cfg = AngleSensorConfig::default();
            let max = sensor_max_volts(battery, &cfg);
            if battery > 5.125 {
                prop_assert_eq!(max, 1.92);
            } else {
                prop_assert_eq!(max, 0.383 * battery - 0.064);
            }
        }
    }
}
