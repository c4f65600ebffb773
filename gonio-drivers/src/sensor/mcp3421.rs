//! MCP3421 18-bit delta-sigma ADC (I2C)
//!
//! Used in one-shot mode: writing the configuration byte with `/RDY` set
//! starts a conversion, and reading back returns the data bytes followed
//! by the configuration byte, whose `/RDY` bit clears once the result is
//! valid.
//!
//! # Configuration byte
//!
//! ```text
//! bit 7    /RDY   write 1: start conversion; read 0: result ready
//! bit 6-5  C1-C0  channel (always 00)
//! bit 4    O/C    1 = continuous, 0 = one-shot
//! bit 3-2  S1-S0  resolution (12/14/16/18 bit)
//! bit 1-0  G1-G0  PGA gain (x1/x2/x4/x8)
//! ```
//!
//! The driver owns the configuration byte; nothing else writes it.

use gonio_core::traits::SensorError;
use gonio_hal::{AdcReader, AdcReading, Clock, Deadline, I2cBus};

/// Factory-default 7-bit address (A0 variant)
pub const MCP3421_ADDRESS: u8 = 0x68;

/// Longest wait for a conversion (18-bit takes ~267 ms)
pub const CONVERSION_TIMEOUT_MS: u32 = 500;

/// Configuration register bits
pub mod reg {
    /// Start conversion (write) / conversion pending (read)
    pub const RDY: u8 = 0x80;
    /// Channel select (single-channel part)
    pub const CHANNEL: u8 = 0x00;
    /// One-shot conversion mode
    pub const ONE_SHOT: u8 = 0x00;
}

/// Conversion resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 240 SPS, 1 mV LSB
    Bits12,
    /// 60 SPS, 250 µV LSB
    Bits14,
    /// 15 SPS, 62.5 µV LSB
    #[default]
    Bits16,
    /// 3.75 SPS, 15.625 µV LSB
    Bits18,
}

impl Resolution {
    /// S1-S0 configuration bits
    pub fn config_bits(self) -> u8 {
        match self {
            Resolution::Bits12 => 0x00,
            Resolution::Bits14 => 0x04,
            Resolution::Bits16 => 0x08,
            Resolution::Bits18 => 0x0C,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Resolution::Bits12 => 12,
            Resolution::Bits14 => 14,
            Resolution::Bits16 => 16,
            Resolution::Bits18 => 18,
        }
    }

    /// Voltage of one code step at unity gain
    pub fn lsb_volts(self) -> f64 {
        match self {
            Resolution::Bits12 => 0.001,
            Resolution::Bits14 => 0.000_25,
            Resolution::Bits16 => 0.000_062_5,
            Resolution::Bits18 => 0.000_015_625,
        }
    }

    /// Number of data bytes in a read
    pub fn data_len(self) -> usize {
        match self {
            Resolution::Bits18 => 3,
            _ => 2,
        }
    }

    /// Width the data bytes are sign-extended from
    ///
    /// 12- and 14-bit results arrive already sign-extended to 16 bits.
    fn word_bits(self) -> u8 {
        match self {
            Resolution::Bits18 => 18,
            _ => 16,
        }
    }
}

/// Programmable gain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    #[default]
    X1,
    X2,
    X4,
    X8,
}

impl Gain {
    /// G1-G0 configuration bits
    pub fn config_bits(self) -> u8 {
        match self {
            Gain::X1 => 0x00,
            Gain::X2 => 0x01,
            Gain::X4 => 0x02,
            Gain::X8 => 0x03,
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            Gain::X1 => 1.0,
            Gain::X2 => 2.0,
            Gain::X4 => 4.0,
            Gain::X8 => 8.0,
        }
    }
}

/// MCP3421 errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mcp3421Error {
    /// I2C transaction failed
    Bus,
    /// Conversion did not finish before [`CONVERSION_TIMEOUT_MS`]
    Timeout,
}

impl From<Mcp3421Error> for SensorError {
    fn from(e: Mcp3421Error) -> Self {
        match e {
            Mcp3421Error::Bus => SensorError::Bus,
            Mcp3421Error::Timeout => SensorError::Timeout,
        }
    }
}

/// Sign-extend the low `bits` bits of `raw`
pub fn sign_extend(raw: u32, bits: u8) -> i32 {
    let shift = 32 - bits as u32;
    ((raw << shift) as i32) >> shift
}

/// MCP3421 in one-shot mode
pub struct Mcp3421<I, C> {
    i2c: I,
    clock: C,
    address: u8,
    resolution: Resolution,
    gain: Gain,
    config: u8,
    timeout_ms: u32,
}

impl<I: I2cBus, C: Clock> Mcp3421<I, C> {
    /// Create a driver at the default address
    pub fn new(i2c: I, clock: C, resolution: Resolution, gain: Gain) -> Self {
        Self {
            i2c,
            clock,
            address: MCP3421_ADDRESS,
            resolution,
            gain,
            config: reg::CHANNEL | reg::ONE_SHOT | resolution.config_bits() | gain.config_bits(),
            timeout_ms: CONVERSION_TIMEOUT_MS,
        }
    }

    /// Override the conversion timeout
    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Configuration byte as last written (without `/RDY`)
    pub fn config(&self) -> u8 {
        self.config
    }

    /// Write the configuration without starting a conversion
    pub fn init(&mut self) -> Result<(), Mcp3421Error> {
        self.i2c
            .write(self.address, &[self.config])
            .map_err(|_| Mcp3421Error::Bus)
    }

    /// Start a one-shot conversion
    pub fn start_conversion(&mut self) -> Result<(), Mcp3421Error> {
        self.i2c
            .write(self.address, &[self.config | reg::RDY])
            .map_err(|_| Mcp3421Error::Bus)
    }

    /// Read back once; `None` while the conversion is still running
    pub fn poll(&mut self) -> Result<Option<i32>, Mcp3421Error> {
        let data_len = self.resolution.data_len();
        let mut buf = [0u8; 4];
        let packet = &mut buf[..data_len + 1];
        self.i2c
            .read(self.address, packet)
            .map_err(|_| Mcp3421Error::Bus)?;

        if packet[data_len] & reg::RDY != 0 {
            return Ok(None);
        }

        let raw = packet[..data_len]
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | b as u32);
        Ok(Some(sign_extend(raw, self.resolution.word_bits())))
    }

    /// Run one conversion and return the signed code
    pub fn convert(&mut self) -> Result<i32, Mcp3421Error> {
        self.start_conversion()?;
        let deadline = Deadline::after(&self.clock, self.timeout_ms);

        loop {
            if let Some(code) = self.poll()? {
                return Ok(code);
            }
            if deadline.expired(&self.clock) {
                return Err(Mcp3421Error::Timeout);
            }
        }
    }
}

impl<I: I2cBus, C: Clock> AdcReader for Mcp3421<I, C> {
    type Error = Mcp3421Error;

    fn read(&mut self) -> Result<AdcReading, Mcp3421Error> {
        let code = self.convert()?;
        Ok(AdcReading {
            code,
            resolution_bits: self.resolution.bits(),
            lsb_volts: self.resolution.lsb_volts() / self.gain.factor(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use heapless::Vec;

    struct TickClock(Cell<u64>);

    impl Clock for TickClock {
        fn now_ms(&self) -> u64 {
            let now = self.0.get();
            self.0.set(now + 1);
            now
        }
    }

    /// Bus that reports busy `busy_reads` times, then `data`
    struct MockBus {
        writes: Vec<(u8, u8), 16>,
        busy_reads: usize,
        data: [u8; 3],
        fail: bool,
    }

    impl MockBus {
        fn new(busy_reads: usize, data: [u8; 3]) -> Self {
            Self {
                writes: Vec::new(),
                busy_reads,
                data,
                fail: false,
            }
        }
    }

    impl I2cBus for MockBus {
        type Error = ();

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            let _ = self.writes.push((address, data[0]));
            Ok(())
        }

        fn read(&mut self, _address: u8, buf: &mut [u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            let data_len = buf.len() - 1;
            buf[..data_len].copy_from_slice(&self.data[..data_len]);
            buf[data_len] = if self.busy_reads > 0 {
                self.busy_reads -= 1;
                reg::RDY
            } else {
                0
            };
            Ok(())
        }
    }

    fn adc(bus: MockBus, resolution: Resolution) -> Mcp3421<MockBus, TickClock> {
        Mcp3421::new(bus, TickClock(Cell::new(0)), resolution, Gain::X1)
    }

    #[test]
    fn test_sign_extension() {
        assert_eq!(sign_extend(0xFFFF, 16), -1);
        assert_eq!(sign_extend(0x3FFFF, 18), -1);
        assert_eq!(sign_extend(0x7FFF, 16), 32_767);
        assert_eq!(sign_extend(0x8000, 16), -32_768);
        assert_eq!(sign_extend(0x1FFFF, 18), 131_071);
        assert_eq!(sign_extend(0x20000, 18), -131_072);
    }

    #[test]
    fn test_config_byte() {
        let mut adc = adc(MockBus::new(0, [0; 3]), Resolution::Bits16);
        assert_eq!(adc.config(), 0x08);

        adc.init().unwrap();
        adc.start_conversion().unwrap();
        assert_eq!(adc.i2c.writes.as_slice(), &[(0x68, 0x08), (0x68, 0x88)]);

        let adc18 = Mcp3421::new(
            MockBus::new(0, [0; 3]),
            TickClock(Cell::new(0)),
            Resolution::Bits18,
            Gain::X8,
        );
        assert_eq!(adc18.config(), 0x0F);
    }

    #[test]
    fn test_waits_for_ready() {
        let mut adc = adc(MockBus::new(3, [0x3E, 0x80, 0]), Resolution::Bits16);
        let reading = adc.read().unwrap();

        assert_eq!(reading.code, 0x3E80);
        assert_eq!(reading.resolution_bits, 16);
        assert!((reading.volts() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_18_bit() {
        let mut adc = adc(MockBus::new(0, [0x03, 0xFF, 0xFE]), Resolution::Bits18);
        assert_eq!(adc.convert(), Ok(-2));
    }

    #[test]
    fn test_never_ready_times_out() {
        let mut adc = adc(MockBus::new(usize::MAX, [0; 3]), Resolution::Bits16);
        assert_eq!(adc.convert(), Err(Mcp3421Error::Timeout));
        assert!(adc.clock.0.get() <= CONVERSION_TIMEOUT_MS as u64 + 2);
    }

    #[test]
    fn test_bus_failure_surfaces() {
        let mut bus = MockBus::new(0, [0; 3]);
        bus.fail = true;
        let mut adc = adc(bus, Resolution::Bits16);
        assert_eq!(adc.init(), Err(Mcp3421Error::Bus));
        assert_eq!(
            adc.read().map_err(SensorError::from),
            Err(SensorError::Bus)
        );
    }

    #[test]
    fn test_lsb_table() {
        assert_eq!(Resolution::Bits12.lsb_volts(), 0.001);
        assert_eq!(Resolution::Bits18.lsb_volts(), 15.625e-6);
        assert_eq!(Resolution::Bits18.data_len(), 3);
        assert_eq!(Resolution::default(), Resolution::Bits16);
    }
}
