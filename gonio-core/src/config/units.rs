//! Display units

/// Feet per meter
pub const FEET_PER_METER: f64 = 3.28084;

/// Inches per meter
pub const INCHES_PER_METER: f64 = 39.3701;

/// Unit the measured length is shown in
///
/// Lengths are always computed and published in meters; conversion only
/// happens at presentation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayUnit {
    #[default]
    Meter,
    Foot,
    Inch,
}

impl DisplayUnit {
    /// Convert a length in meters to this unit
    pub fn convert(self, meters: f64) -> f64 {
        match self {
            DisplayUnit::Meter => meters,
            DisplayUnit::Foot => meters * FEET_PER_METER,
            DisplayUnit::Inch => meters * INCHES_PER_METER,
        }
    }

    /// Next unit in the mode-button cycle (m -> ft -> in -> m)
    pub fn next(self) -> Self {
        match self {
            DisplayUnit::Meter => DisplayUnit::Foot,
            DisplayUnit::Foot => DisplayUnit::Inch,
            DisplayUnit::Inch => DisplayUnit::Meter,
        }
    }

    /// Persisted code
    pub fn code(self) -> u16 {
        match self {
            DisplayUnit::Meter => 0,
            DisplayUnit::Foot => 1,
            DisplayUnit::Inch => 2,
        }
    }

    /// Decode a persisted code
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(DisplayUnit::Meter),
            1 => Some(DisplayUnit::Foot),
            2 => Some(DisplayUnit::Inch),
            _ => None,
        }
    }

    /// Short symbol for the renderer
    pub fn symbol(self) -> &'static str {
        match self {
            DisplayUnit::Meter => "m",
            DisplayUnit::Foot => "ft",
            DisplayUnit::Inch => "in",
        }
    }

    /// Long name, as printed in the configuration dump
    pub fn name(self) -> &'static str {
        match self {
            DisplayUnit::Meter => "meters",
            DisplayUnit::Foot => "feet",
            DisplayUnit::Inch => "inches",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert() {
        assert_eq!(DisplayUnit::Meter.convert(1.0), 1.0);
        assert!((DisplayUnit::Foot.convert(1.0) - 3.28084).abs() < 1e-5);
        assert!((DisplayUnit::Inch.convert(1.0) - 39.3701).abs() < 1e-5);
        assert!((DisplayUnit::Foot.convert(2.5) - 8.2021).abs() < 1e-5);
    }

    #[test]
    fn test_cycle_returns_to_start() {
        let start = DisplayUnit::default();
        assert_eq!(start, DisplayUnit::Meter);
        assert_eq!(start.next(), DisplayUnit::Foot);
        assert_eq!(start.next().next(), DisplayUnit::Inch);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn test_codes() {
        for unit in [DisplayUnit::Meter, DisplayUnit::Foot, DisplayUnit::Inch] {
            assert_eq!(DisplayUnit::from_code(unit.code()), Some(unit));
        }
        assert_eq!(DisplayUnit::from_code(3), None);
        assert_eq!(DisplayUnit::from_code(0xFFFF), None);
    }
}
