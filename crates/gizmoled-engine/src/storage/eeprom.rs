use embedded_storage::{ReadStorage, Storage};

use super::{StorageDriver, StorageError, check_bounds};
use crate::config::PAGE_SIZE;

/// Storage region on a byte-writable EEPROM.
///
/// Writes go out page by page and pages whose content did not change are
/// skipped to spare write cycles.
pub struct EepromStorage<S> {
    storage: S,
    base: u32,
    size: usize,
}

impl<S: Storage> EepromStorage<S> {
    /// Use `size` bytes of `storage` starting at `base`
    pub fn new(storage: S, base: u32, size: usize) -> Result<Self, StorageError> {
        check_bounds(base as usize, size, storage.capacity())?;
        Ok(Self { storage, base, size })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn address(&self, offset: usize) -> Result<u32, StorageError> {
        u32::try_from(offset)
            .ok()
            .and_then(|offset| self.base.checked_add(offset))
            .ok_or(StorageError::OutOfBounds)
    }
}

impl<S: Storage> StorageDriver for EepromStorage<S> {
    fn capacity(&self) -> usize {
        self.size
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StorageError> {
        check_bounds(offset, buffer.len(), self.size)?;
        let address = self.address(offset)?;
        self.storage
            .read(address, buffer)
            .map_err(|_| StorageError::DriverError)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        check_bounds(offset, data.len(), self.size)?;

        let mut current = [0u8; PAGE_SIZE];
        for (i, page) in data.chunks(PAGE_SIZE).enumerate() {
            let address = self.address(offset + i * PAGE_SIZE)?;
            let current = &mut current[..page.len()];
            self.storage
                .read(address, current)
                .map_err(|_| StorageError::DriverError)?;
            if current == page {
                continue;
            }
            self.storage
                .write(address, page)
                .map_err(|_| StorageError::DriverError)?;
        }
        Ok(())
    }
}
