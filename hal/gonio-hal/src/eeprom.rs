//! Byte-addressable persistent storage abstractions
//!
//! Calibration data lives at fixed offsets in a small EEPROM-like store.
//! Chips without EEPROM emulate it on top of flash.

/// Errors from persistent storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Access extends past the end of the store
    OutOfRange,
    /// The underlying memory operation failed
    Io,
}

/// Byte-addressable persistent store
///
/// Writes are synchronous: once `write` returns `Ok`, the bytes survive a
/// power cycle.
pub trait ByteStore {
    /// Total number of addressable bytes
    fn capacity(&self) -> usize;

    /// Read `buf.len()` bytes starting at `offset`
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError>;

    /// Write `data` starting at `offset`, leaving all other bytes untouched
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError>;

    /// Check that `len` bytes starting at `offset` fit in the store
    fn check_range(&self, offset: usize, len: usize) -> Result<(), StoreError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.capacity() => Ok(()),
            _ => Err(StoreError::OutOfRange),
        }
    }
}

/// Apply a write to the RAM mirror of a store backed by whole-image commits
///
/// The new bytes are staged on a copy of the mirror and the mirror only
/// takes them once `commit` has stored that image. A write that changes
/// nothing skips the commit.
pub fn write_through<const N: usize>(
    mirror: &mut [u8; N],
    offset: usize,
    data: &[u8],
    commit: impl FnOnce(&[u8; N]) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    let end = offset
        .checked_add(data.len())
        .filter(|&end| end <= N)
        .ok_or(StoreError::OutOfRange)?;
    if mirror[offset..end] == *data {
        return Ok(());
    }

    let mut staged = *mirror;
    staged[offset..end].copy_from_slice(data);
    commit(&staged)?;
    *mirror = staged;
    Ok(())
}
