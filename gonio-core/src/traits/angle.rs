//! Angle sensor trait

/// One complete angle acquisition
///
/// Always reflects a full oversampling window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AngleSample {
    /// Oversampled ADC code
    pub raw_code: i32,
    /// ADC resolution in bits
    pub resolution_bits: u8,
    /// Voltage of one code step
    pub lsb_volts: f64,
    /// Sensor voltage at the ADC input
    pub volts: f64,
    /// Angle from the linear sensor map, before the offset
    pub mapped_deg: f64,
    /// Calibrated angle (mapped + offset, clamped to >= 0)
    pub angle_deg: f64,
    /// Battery voltage at sample time
    pub battery_volts: f64,
    /// Zero offset that was applied
    pub offset_deg: f64,
}

/// Errors from angle acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction with the ADC failed
    Bus,
    /// Conversion did not complete before its deadline
    Timeout,
    /// Battery channel read failed
    Battery,
}

/// Calibrated angle sensor
pub trait AngleSensor {
    /// Acquire one oversampled, calibrated sample
    fn sample(&mut self) -> Result<AngleSample, SensorError>;

    /// Current zero offset in degrees
    fn offset(&self) -> f64;

    /// Replace the zero offset
    fn set_offset(&mut self, offset_deg: f64);

    /// Make the current arm position read as zero
    ///
    /// Returns the new offset.
    fn zero(&mut self) -> Result<f64, SensorError> {
        let sample = self.sample()?;
        let offset = -sample.mapped_deg;
        self.set_offset(offset);
        Ok(offset)
    }
}
