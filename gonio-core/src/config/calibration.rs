//! Persisted user calibration
//!
//! Layout in the byte store (all little-endian):
//!
//! ```text
//! offset  size  field
//! 0       2     signature (0xBEEF)
//! 2       8     angle offset, IEEE-754 binary64
//! 10      2     display unit code
//! ```

use core::ops::Range;

use super::units::DisplayUnit;

/// Marks an initialized calibration block
pub const CALIBRATION_SIGNATURE: u16 = 0xBEEF;

/// Byte offset of the signature
pub const SIGNATURE_OFFSET: usize = 0;

/// Byte offset of the angle offset field
pub const ANGLE_OFFSET_OFFSET: usize = SIGNATURE_OFFSET + 2;

/// Byte offset of the unit field
pub const UNIT_OFFSET: usize = ANGLE_OFFSET_OFFSET + 8;

/// Encoded size of a full record
pub const RECORD_LEN: usize = UNIT_OFFSET + 2;

/// A single persisted field
///
/// Saving a field writes exactly its bytes and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationField {
    Signature,
    AngleOffset,
    Unit,
}

impl CalibrationField {
    /// Byte range of this field within the record
    pub fn range(self) -> Range<usize> {
        match self {
            CalibrationField::Signature => SIGNATURE_OFFSET..ANGLE_OFFSET_OFFSET,
            CalibrationField::AngleOffset => ANGLE_OFFSET_OFFSET..UNIT_OFFSET,
            CalibrationField::Unit => UNIT_OFFSET..RECORD_LEN,
        }
    }
}

/// Why a stored record was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Signature missing or wrong (never initialized or cleared)
    BadSignature(u16),
    /// Unit field holds an unknown code
    UnknownUnit(u16),
}

/// User calibration record
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRecord {
    /// Validity signature
    pub signature: u16,
    /// Added to the mapped sensor angle, in degrees
    pub angle_offset: f64,
    /// Selected display unit
    pub unit: DisplayUnit,
}

impl Default for CalibrationRecord {
    fn default() -> Self {
        Self {
            signature: CALIBRATION_SIGNATURE,
            angle_offset: 0.0,
            unit: DisplayUnit::default(),
        }
    }
}

impl CalibrationRecord {
    /// Encode to the persisted byte layout
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut bytes = [0u8; RECORD_LEN];
        bytes[CalibrationField::Signature.range()].copy_from_slice(&self.signature.to_le_bytes());
        bytes[CalibrationField::AngleOffset.range()]
            .copy_from_slice(&self.angle_offset.to_le_bytes());
        bytes[CalibrationField::Unit.range()].copy_from_slice(&self.unit.code().to_le_bytes());
        bytes
    }

    /// Decode from the persisted byte layout
    pub fn decode(bytes: &[u8; RECORD_LEN]) -> Result<Self, DecodeError> {
        let signature = u16::from_le_bytes([bytes[SIGNATURE_OFFSET], bytes[SIGNATURE_OFFSET + 1]]);
        if signature != CALIBRATION_SIGNATURE {
            return Err(DecodeError::BadSignature(signature));
        }

        let mut offset = [0u8; 8];
        offset.copy_from_slice(&bytes[CalibrationField::AngleOffset.range()]);
        let angle_offset = f64::from_le_bytes(offset);

        let code = u16::from_le_bytes([bytes[UNIT_OFFSET], bytes[UNIT_OFFSET + 1]]);
        let unit = DisplayUnit::from_code(code).ok_or(DecodeError::UnknownUnit(code))?;

        Ok(Self {
            signature,
            angle_offset,
            unit,
        })
    }
}
