//! Calibration storage trait

use crate::config::{CalibrationField, CalibrationRecord};

/// Errors from calibration storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The persistent store failed
    Io,
}

impl From<gonio_hal::StoreError> for StorageError {
    fn from(_: gonio_hal::StoreError) -> Self {
        StorageError::Io
    }
}

/// Persistent calibration store
pub trait CalibrationStorage {
    /// Load the stored record
    ///
    /// A missing or corrupt record is not an error: the defaults are
    /// written back and returned.
    fn load(&mut self) -> Result<CalibrationRecord, StorageError>;

    /// Persist exactly one field of `record`
    fn save(
        &mut self,
        record: &CalibrationRecord,
        field: CalibrationField,
    ) -> Result<(), StorageError>;

    /// Invalidate the stored record so the next load resets it
    fn clear(&mut self) -> Result<(), StorageError>;
}
