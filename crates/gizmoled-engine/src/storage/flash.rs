use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};

use super::{StorageDriver, StorageError, check_bounds};

/// Storage region on NOR flash.
///
/// Writes erase every sector they touch first, so they must start on a sector
/// boundary. The region itself must start on a sector boundary.
pub struct NorFlashStorage<F> {
    flash: F,
    base: u32,
    size: usize,
}

impl<F: NorFlash> NorFlashStorage<F> {
    /// Use `size` bytes of `flash` starting at `base`
    pub fn new(flash: F, base: u32, size: usize) -> Result<Self, StorageError> {
        if base as usize % F::ERASE_SIZE != 0 || size % F::ERASE_SIZE != 0 {
            return Err(StorageError::Misaligned);
        }
        check_bounds(base as usize, size, flash.capacity())?;
        Ok(Self { flash, base, size })
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn address(&self, offset: usize) -> Result<u32, StorageError> {
        u32::try_from(offset)
            .ok()
            .and_then(|offset| self.base.checked_add(offset))
            .ok_or(StorageError::OutOfBounds)
    }
}

impl<F: NorFlash> StorageDriver for NorFlashStorage<F> {
    fn capacity(&self) -> usize {
        self.size
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StorageError> {
        check_bounds(offset, buffer.len(), self.size)?;
        let address = self.address(offset)?;
        self.flash
            .read(address, buffer)
            .map_err(|_| StorageError::DriverError)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        if offset % F::ERASE_SIZE != 0 || data.len() % F::WRITE_SIZE != 0 {
            return Err(StorageError::Misaligned);
        }
        let erase_len = data.len().div_ceil(F::ERASE_SIZE) * F::ERASE_SIZE;
        check_bounds(offset, erase_len, self.size)?;

        let start = self.address(offset)?;
        let end = self.address(offset + erase_len)?;
        self.flash
            .erase(start, end)
            .map_err(|_| StorageError::DriverError)?;
        self.flash
            .write(start, data)
            .map_err(|_| StorageError::DriverError)
    }
}
