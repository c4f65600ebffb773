//! Battery gauge
//!
//! The pack feeds a 5 V LDO. Below 5.25 V the regulator drops out, so the
//! usable range is 5.25 V (empty) to 6.0 V (full).

/// Voltage at which the LDO drops out
pub const BATTERY_EMPTY_VOLTS: f64 = 5.25;

/// Voltage of a fully charged pack
pub const BATTERY_FULL_VOLTS: f64 = 6.0;

/// State of charge in percent, clamped to 0..=100
pub fn battery_percent(volts: f64) -> u8 {
    let span = BATTERY_FULL_VOLTS - BATTERY_EMPTY_VOLTS;
    let fraction = (volts - BATTERY_EMPTY_VOLTS) / span;

    if fraction.is_nan() || fraction <= 0.0 {
        0
    } else if fraction >= 1.0 {
        100
    } else {
        (fraction * 100.0) as u8
    }
}

/// Battery icon fill level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryLevel {
    Full,
    ThreeQuarters,
    Half,
    Quarter,
    Low,
}

impl BatteryLevel {
    /// Icon bucket for a charge percentage
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            76..=u8::MAX => BatteryLevel::Full,
            51..=75 => BatteryLevel::ThreeQuarters,
            26..=50 => BatteryLevel::Half,
            16..=25 => BatteryLevel::Quarter,
            _ => BatteryLevel::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(battery_percent(5.25), 0);
        assert_eq!(battery_percent(6.0), 100);
        assert_eq!(battery_percent(5.625), 50);
    }

    #[test]
    fn test_clamped() {
        assert_eq!(battery_percent(4.0), 0);
        assert_eq!(battery_percent(7.2), 100);
        assert_eq!(battery_percent(f64::NAN), 0);
    }

    #[test]
    fn test_levels() {
        assert_eq!(BatteryLevel::from_percent(100), BatteryLevel::Full);
        assert_eq!(BatteryLevel::from_percent(60), BatteryLevel::ThreeQuarters);
        assert_eq!(BatteryLevel::from_percent(50), BatteryLevel::Half);
        assert_eq!(BatteryLevel::from_percent(20), BatteryLevel::Quarter);
        assert_eq!(BatteryLevel::from_percent(3), BatteryLevel::Low);
    }
}
