//! Calibration record in a byte-addressable store
//!
//! The record sits at a fixed base address using the layout from
//! [`gonio_core::config::calibration`]. A bad signature or an unknown unit
//! code resets the block to defaults, which are written back immediately.

use gonio_core::config::{CalibrationField, CalibrationRecord, RECORD_LEN};
use gonio_core::traits::{CalibrationStorage, StorageError};
use gonio_hal::ByteStore;

/// Calibration store on EEPROM (or flash-emulated EEPROM)
pub struct EepromCalibrationStore<S> {
    store: S,
    base: usize,
}

impl<S: ByteStore> EepromCalibrationStore<S> {
    /// Record at address 0
    pub fn new(store: S) -> Self {
        Self::at(store, 0)
    }

    /// Record at `base`
    pub fn at(store: S, base: usize) -> Self {
        Self { store, base }
    }

    pub fn release(self) -> S {
        self.store
    }
}

impl<S: ByteStore> CalibrationStorage for EepromCalibrationStore<S> {
    fn load(&mut self) -> Result<CalibrationRecord, StorageError> {
        let mut bytes = [0u8; RECORD_LEN];
        self.store.read(self.base, &mut bytes)?;

        match CalibrationRecord::decode(&bytes) {
            Ok(record) => Ok(record),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Calibration invalid ({}), writing defaults", _e);
                let record = CalibrationRecord::default();
                self.store.write(self.base, &record.encode())?;
                Ok(record)
            }
        }
    }

    fn save(
        &mut self,
        record: &CalibrationRecord,
        field: CalibrationField,
    ) -> Result<(), StorageError> {
        let bytes = record.encode();
        let range = field.range();
        self.store.write(self.base + range.start, &bytes[range])?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let range = CalibrationField::Signature.range();
        self.store.write(self.base + range.start, &[0u8; 2])?;
        Ok(())
    }
}
