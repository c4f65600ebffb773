//! Analog-to-digital converter abstractions
//!
//! Converters report signed codes together with the resolution and the
//! voltage of one step, so callers never hard-code converter details.

/// One raw conversion result
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcReading {
    /// Signed conversion code
    pub code: i32,
    /// Resolution the converter was running at, in bits
    pub resolution_bits: u8,
    /// Voltage of one code step (LSB) in volts
    pub lsb_volts: f64,
}

impl AdcReading {
    /// Input voltage represented by this reading
    pub fn volts(&self) -> f64 {
        self.code as f64 * self.lsb_volts
    }
}

/// Signed-code analog read primitive
pub trait AdcReader {
    /// Error type for conversions
    type Error;

    /// Perform one complete conversion
    ///
    /// Implementations that have to wait for a conversion must bound the
    /// wait and report a timeout through `Self::Error`.
    fn read(&mut self) -> Result<AdcReading, Self::Error>;
}
