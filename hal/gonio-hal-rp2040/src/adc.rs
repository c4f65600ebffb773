//! On-chip ADC channel
//!
//! The RP2040 ADC is 12-bit, unipolar, referenced to the 3.3 V rail.

use embassy_rp::adc::{Adc, Blocking, Channel, Error};
use gonio_hal::{AdcReader, AdcReading};

/// ADC resolution in bits
pub const ADC_BITS: u8 = 12;

/// ADC reference voltage
pub const ADC_VREF: f64 = 3.3;

/// Battery divider tap on one ADC channel
pub struct BatteryAdc<'d> {
    adc: Adc<'d, Blocking>,
    channel: Channel<'d>,
}

impl<'d> BatteryAdc<'d> {
    pub fn new(adc: Adc<'d, Blocking>, channel: Channel<'d>) -> Self {
        Self { adc, channel }
    }
}

impl<'d> AdcReader for BatteryAdc<'d> {
    type Error = Error;

    fn read(&mut self) -> Result<AdcReading, Error> {
        let code = self.adc.blocking_read(&mut self.channel)?;
        Ok(AdcReading {
            code: code as i32,
            resolution_bits: ADC_BITS,
            lsb_volts: ADC_VREF / (1u32 << ADC_BITS) as f64,
        })
    }
}
