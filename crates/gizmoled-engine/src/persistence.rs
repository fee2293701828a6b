//! Fixed-layout persistence of the engine state
//!
//! The region is split into [`PAGE_SIZE`] pages:
//!
//! | Page      | Content                               |
//! |-----------|---------------------------------------|
//! | 0         | [`DeviceState`] record                |
//! | 1         | device name, zero padded              |
//! | 2 + i     | settings of effect `i`, registry order |
//!
//! The whole region is written at once. A record whose initialized marker
//! does not match is never trusted, whatever the rest of the region holds.

use core::fmt;
use core::mem::{offset_of, size_of};

use log::info;

use crate::config::{MAX_DEVICE_NAME, MAX_EFFECTS, MAX_SETTINGS_SIZE, PAGE_SIZE};
use crate::engine::EngineState;
use crate::state::{DeviceName, DeviceState, INITIALIZED_MARKER};
use crate::storage::{StorageDriver, StorageError};

/// Page holding the selection record
pub const DEVICE_STATE_PAGE: usize = 0;
/// Page holding the device name
pub const DEVICE_NAME_PAGE: usize = 1;
/// First effect settings page
pub const EFFECT_SETTINGS_PAGE: usize = 2;

/// Bytes needed to persist a full registry
pub const STORAGE_REGION_SIZE: usize = PAGE_SIZE * (EFFECT_SETTINGS_PAGE + MAX_EFFECTS);

const DEVICE_STATE_SIZE: usize = size_of::<DeviceState>();
const MARKER_OFFSET: usize = offset_of!(DeviceState, is_initialized);

const _: () = assert!(DEVICE_STATE_SIZE <= PAGE_SIZE);
const _: () = assert!(MAX_DEVICE_NAME <= PAGE_SIZE);
const _: () = assert!(MAX_SETTINGS_SIZE <= PAGE_SIZE);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceError {
    /// The storage driver failed
    Storage(StorageError),
    /// Storage holds no record written by [`Persistence::save`]
    InvalidMagicHeader,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "storage failure: {}", err),
            Self::InvalidMagicHeader => write!(f, "invalid magic header"),
        }
    }
}

impl From<StorageError> for PersistenceError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

const fn page_offset(page: usize) -> usize {
    page * PAGE_SIZE
}

/// Serializer of the engine state into one storage region
pub struct Persistence<S> {
    driver: S,
    buffer: [u8; STORAGE_REGION_SIZE],
}

impl<S: StorageDriver> Persistence<S> {
    /// Wrap a driver. Its region must hold [`STORAGE_REGION_SIZE`] bytes.
    pub fn new(driver: S) -> Result<Self, PersistenceError> {
        if driver.capacity() < STORAGE_REGION_SIZE {
            return Err(StorageError::OutOfBounds.into());
        }
        Ok(Self {
            driver,
            buffer: [0; STORAGE_REGION_SIZE],
        })
    }

    pub fn driver(&self) -> &S {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut S {
        &mut self.driver
    }

    pub fn into_inner(self) -> S {
        self.driver
    }

    /// Mark the record initialized and write the whole state in one write
    pub fn save<B>(&mut self, state: &mut EngineState<B>) -> Result<(), PersistenceError> {
        state.device.is_initialized = INITIALIZED_MARKER;

        self.buffer.fill(0);
        let device = page_offset(DEVICE_STATE_PAGE);
        self.buffer[device..device + DEVICE_STATE_SIZE].copy_from_slice(state.device.as_bytes());

        let name = page_offset(DEVICE_NAME_PAGE);
        self.buffer[name..name + MAX_DEVICE_NAME].copy_from_slice(&state.name.to_storage());

        for (i, effect) in state.registry.iter().enumerate() {
            let offset = page_offset(EFFECT_SETTINGS_PAGE + i);
            let settings = effect.settings();
            self.buffer[offset..offset + settings.len()].copy_from_slice(settings);
        }

        self.driver.write(0, &self.buffer)?;
        info!("persistence: saved {} effects", state.registry.count());
        Ok(())
    }

    /// Restore the state written by [`Self::save`].
    ///
    /// Nothing is touched when the record is not marked initialized.
    pub fn load<B>(&mut self, state: &mut EngineState<B>) -> Result<(), PersistenceError> {
        let device = page_offset(DEVICE_STATE_PAGE);
        let page = &mut self.buffer[device..device + PAGE_SIZE];
        self.driver.read(device, page)?;
        if page[MARKER_OFFSET] != INITIALIZED_MARKER {
            return Err(PersistenceError::InvalidMagicHeader);
        }

        let rest = &mut self.buffer[PAGE_SIZE..];
        self.driver.read(PAGE_SIZE, rest)?;

        state.device =
            bytemuck::pod_read_unaligned(&self.buffer[device..device + DEVICE_STATE_SIZE]);

        let name = page_offset(DEVICE_NAME_PAGE);
        let stored_name = &self.buffer[name..name + MAX_DEVICE_NAME];
        if stored_name[0] != 0 {
            state.name = DeviceName::from_storage(stored_name);
        }

        for (i, effect) in state.registry.iter_mut().enumerate() {
            let offset = page_offset(EFFECT_SETTINGS_PAGE + i);
            let size = effect.settings_size();
            effect.write_settings(&self.buffer[offset..offset + size]);
        }

        state.sync_registry_identity();
        Ok(())
    }
}
