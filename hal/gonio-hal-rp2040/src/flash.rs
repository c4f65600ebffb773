//! EEPROM emulation in flash
//!
//! The RP2040 has no EEPROM, so a small RAM mirror stands in for one and
//! is committed to the last flash sector on every write. The sector is
//! erased and rewritten as a whole, which keeps untouched bytes intact.
//! The mirror follows the sector: a failed commit leaves it unchanged.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use gonio_hal::{write_through, ByteStore, StoreError};

/// Flash size on the target board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Emulated EEPROM size
pub const EEPROM_SIZE: usize = 256;

/// Start of the sector backing the emulated EEPROM
pub const EEPROM_SECTOR: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// Emulated EEPROM on the last flash sector
pub struct FlashEeprom<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    mirror: [u8; EEPROM_SIZE],
}

impl<'d> FlashEeprom<'d> {
    /// Take the flash and load the mirror from the backing sector
    ///
    /// If the sector cannot be read the mirror stays erased, which reads
    /// back as an invalid calibration block.
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        let mut this = Self {
            flash: Flash::new_blocking(flash),
            mirror: [0xFF; EEPROM_SIZE],
        };
        if let Err(_e) = this.flash.blocking_read(EEPROM_SECTOR, &mut this.mirror) {
            #[cfg(feature = "defmt")]
            defmt::error!("EEPROM sector read failed: {}", _e);
            this.mirror = [0xFF; EEPROM_SIZE];
        }
        this
    }

    fn commit(
        flash: &mut Flash<'d, FLASH, Blocking, FLASH_SIZE>,
        image: &[u8; EEPROM_SIZE],
    ) -> Result<(), StoreError> {
        flash
            .blocking_erase(EEPROM_SECTOR, EEPROM_SECTOR + ERASE_SIZE as u32)
            .map_err(|_| StoreError::Io)?;
        flash
            .blocking_write(EEPROM_SECTOR, image)
            .map_err(|_| StoreError::Io)
    }
}

impl<'d> ByteStore for FlashEeprom<'d> {
    fn capacity(&self) -> usize {
        EEPROM_SIZE
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        self.check_range(offset, buf.len())?;
        buf.copy_from_slice(&self.mirror[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        let flash = &mut self.flash;
        write_through(&mut self.mirror, offset, data, |image| {
            Self::commit(flash, image)
        })
    }
}
