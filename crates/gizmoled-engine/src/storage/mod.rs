//! Non-volatile storage backends
//!
//! The persistence layer talks to a [`StorageDriver`]: a byte-addressed view
//! of one fixed region. Two backends are provided and picked when the
//! firmware is composed: [`NorFlashStorage`] for block-erased flash and
//! [`EepromStorage`] for byte-writable EEPROM.

mod eeprom;
mod flash;

use core::fmt;

pub use eeprom::EepromStorage;
pub use flash::NorFlashStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The underlying device reported an error
    DriverError,
    /// Access outside of the storage region
    OutOfBounds,
    /// Offset or length does not match the device granularity
    Misaligned,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DriverError => write!(f, "storage driver error"),
            Self::OutOfBounds => write!(f, "access outside of the storage region"),
            Self::Misaligned => write!(f, "misaligned storage access"),
        }
    }
}

/// Byte-addressed storage region
pub trait StorageDriver {
    /// Size of the region in bytes
    fn capacity(&self) -> usize;

    /// Read `buffer.len()` bytes starting at `offset`
    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `offset`
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;
}

/// Check that `len` bytes at `offset` fit into a region of `capacity` bytes
pub(crate) fn check_bounds(offset: usize, len: usize, capacity: usize) -> Result<(), StorageError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(StorageError::OutOfBounds),
    }
}
