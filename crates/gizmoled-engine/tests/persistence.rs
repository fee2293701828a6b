//! Fixed-layout persistence and storage backends.

mod common;

use common::{
    AnimationLog, MockEeprom, MockFlash, RecordingPeripheral, SECTOR_SIZE, WHEEL_SIZE, declarations,
    engine, flash, flash_persistence, persistence_on, test_config,
};
use gizmoled_engine::persistence::{DEVICE_NAME_PAGE, EFFECT_SETTINGS_PAGE};
use gizmoled_engine::state::INITIALIZED_MARKER;
use gizmoled_engine::{
    BootSource, ChannelId, EepromStorage, EffectName, EffectRegistry, EngineState, NorFlashStorage,
    Persistence, PersistenceError, STORAGE_REGION_SIZE, StorageDriver, StorageError,
};

const PAGE: usize = 128;

fn customize(state: &mut EngineState<common::Recorder>) {
    let mut peripheral = RecordingPeripheral::default();
    state.select_effect(1, &mut peripheral);
    state.select_effect(2, &mut peripheral);
    state.write_effect_settings(ChannelId::Effect(0), &[0xAB; 24]);
    state.write_effect_settings(ChannelId::Effect(2), &[0x11; 20]);
    state.function_call(b"\x01\x01Rex", &mut peripheral);
}

// -----------------------------------------------------------------------------
// Round trip
// -----------------------------------------------------------------------------

#[test]
fn save_then_load_restores_everything() {
    let (mut saved, _) = engine();
    customize(&mut saved);
    let mut persistence = flash_persistence();
    persistence.save(&mut saved).unwrap();

    let (mut loaded, _) = engine();
    persistence.load(&mut loaded).unwrap();

    assert_eq!(loaded.device_state(), saved.device_state());
    assert!(loaded.device_state().is_initialized());
    assert_eq!(loaded.device_name(), saved.device_name());
    for (a, b) in loaded.registry().iter().zip(saved.registry().iter()) {
        assert_eq!(a.settings(), b.settings());
    }
    assert_eq!(loaded.device_state().selected_effect, 2);
    assert_eq!(loaded.device_state().selected_effect_secondary, 1);
    assert_eq!(loaded.advertised_name(), "Rex");
}

#[test]
fn save_issues_single_write() {
    let (mut state, _) = engine();
    let mut persistence = flash_persistence();

    persistence.save(&mut state).unwrap();

    assert_eq!(flash(&persistence).erases, 1);
    assert_eq!(flash(&persistence).writes, 1);
    assert!(state.device_state().is_initialized());
}

#[test]
fn save_lays_out_fixed_pages() {
    let (mut state, _) = engine();
    customize(&mut state);
    let mut persistence = flash_persistence();
    persistence.save(&mut state).unwrap();

    let data = &flash(&persistence).data;
    assert_eq!(data[0], 2);
    assert_eq!(data[1], 1);
    assert_eq!(data[2], 3);
    assert_eq!(&data[3..6], &[0, 1, 5]);
    assert_eq!(data[3 + 24], INITIALIZED_MARKER);
    assert_eq!(&data[DEVICE_NAME_PAGE * PAGE..DEVICE_NAME_PAGE * PAGE + 4], b"Rex\0");
    let first = EFFECT_SETTINGS_PAGE * PAGE;
    assert_eq!(&data[first..first + 24], &[0xAB; 24]);
    assert_eq!(&data[first + 2 * PAGE..first + 2 * PAGE + 20], &[0x11; 20]);
}

// -----------------------------------------------------------------------------
// Invalid storage
// -----------------------------------------------------------------------------

#[test]
fn erased_storage_keeps_defaults() {
    let (mut state, _) = engine();
    let mut persistence = flash_persistence();

    assert_eq!(persistence.load(&mut state), Err(PersistenceError::InvalidMagicHeader));

    assert_eq!(state.device_state().selected_effect, 0);
    assert!(!state.device_state().is_initialized());
    assert!(state.device_name().is_empty());
    for effect in state.registry().iter() {
        assert_eq!(effect.settings(), effect.default_settings());
    }
}

#[test]
fn garbage_without_marker_is_ignored() {
    let mut raw = MockFlash::new();
    for (i, byte) in raw.data.iter_mut().enumerate() {
        *byte = (i * 7) as u8;
    }
    raw.data[27] = 0x5A;
    let mut persistence = persistence_on(raw);
    let (mut state, _) = engine();

    assert_eq!(persistence.load(&mut state), Err(PersistenceError::InvalidMagicHeader));

    assert_eq!(state.device_state().selected_effect, 0);
    assert!(state.device_name().is_empty());
    for effect in state.registry().iter() {
        assert_eq!(effect.settings(), effect.default_settings());
    }
}

#[test]
fn stored_selection_beyond_registry_is_reset() {
    let (mut saved, _) = engine();
    customize(&mut saved);
    let mut persistence = flash_persistence();
    persistence.save(&mut saved).unwrap();

    let log = AnimationLog::default();
    let [blink, wheel, _] = declarations(&log);
    let registry = EffectRegistry::new([blink, wheel]).unwrap();
    let mut loaded = EngineState::new(registry, test_config());
    persistence.load(&mut loaded).unwrap();

    let device = loaded.device_state();
    assert_eq!(device.number_of_effects, 2);
    assert_eq!(device.selected_effect, 0);
    assert_eq!(device.selected_effect_secondary, 1);
    assert_eq!(device.effect_names[2], 0);
    let names: Vec<_> = device.effect_names[..2]
        .iter()
        .map(|&raw| EffectName::from_raw(raw))
        .collect();
    assert_eq!(names, vec![Some(EffectName::Blink), Some(EffectName::Wheel)]);
}

#[test]
fn name_with_zero_byte_survives_save_and_load() {
    let (mut saved, _) = engine();
    let mut peripheral = RecordingPeripheral::default();
    assert!(saved.function_call(b"\x01\x01ab\0cd", &mut peripheral));
    assert_eq!(peripheral.local_name.as_deref(), Some("ab"));

    let mut persistence = flash_persistence();
    persistence.save(&mut saved).unwrap();
    let (mut loaded, _) = engine();
    persistence.load(&mut loaded).unwrap();

    assert_eq!(loaded.device_name(), saved.device_name());
    assert_eq!(loaded.advertised_name(), "ab");
}

#[test]
fn name_with_leading_zero_is_not_loaded() {
    let (mut saved, _) = engine();
    customize(&mut saved);
    let mut persistence = flash_persistence();
    persistence.save(&mut saved).unwrap();

    let mut raw = persistence.into_inner().into_inner();
    raw.data[DEVICE_NAME_PAGE * PAGE] = 0;
    let mut persistence = persistence_on(raw);

    let (mut loaded, _) = engine();
    persistence.load(&mut loaded).unwrap();

    assert!(loaded.device_name().is_empty());
    assert_eq!(loaded.advertised_name(), "Collar");
    assert_eq!(loaded.device_state().selected_effect, 2);
}

// -----------------------------------------------------------------------------
// Drivers
// -----------------------------------------------------------------------------

#[test]
fn driver_failure_is_reported() {
    let mut raw = MockFlash::new();
    raw.fail = true;
    let mut persistence = persistence_on(raw);
    let (mut state, _) = engine();

    assert_eq!(
        persistence.save(&mut state),
        Err(PersistenceError::Storage(StorageError::DriverError))
    );
    assert_eq!(
        persistence.load(&mut state),
        Err(PersistenceError::Storage(StorageError::DriverError))
    );
}

#[test]
fn region_must_hold_full_layout() {
    let storage = EepromStorage::new(MockEeprom::new(4096), 0, STORAGE_REGION_SIZE - 1).unwrap();

    assert_eq!(
        Persistence::new(storage).err(),
        Some(PersistenceError::Storage(StorageError::OutOfBounds))
    );
}

#[test]
fn flash_region_must_be_sector_aligned() {
    assert_eq!(
        NorFlashStorage::new(MockFlash::new(), 100, SECTOR_SIZE).err(),
        Some(StorageError::Misaligned)
    );
    assert_eq!(
        NorFlashStorage::new(MockFlash::new(), 0, 1000).err(),
        Some(StorageError::Misaligned)
    );
    assert_eq!(
        NorFlashStorage::new(MockFlash::new(), 0, 8 * SECTOR_SIZE).err(),
        Some(StorageError::OutOfBounds)
    );
}

#[test]
fn flash_reads_outside_region_fail() {
    let mut storage =
        NorFlashStorage::new(MockFlash::new(), SECTOR_SIZE as u32, SECTOR_SIZE).unwrap();
    let mut buffer = [0u8; 8];

    assert_eq!(storage.read(SECTOR_SIZE - 4, &mut buffer), Err(StorageError::OutOfBounds));
    assert_eq!(storage.read(0, &mut buffer), Ok(()));
    assert_eq!(buffer, [0xFF; 8]);
}

#[test]
fn eeprom_skips_unchanged_pages() {
    let storage = EepromStorage::new(MockEeprom::new(4096), 0, STORAGE_REGION_SIZE).unwrap();
    let mut persistence = Persistence::new(storage).unwrap();
    let (mut state, _) = engine();

    persistence.save(&mut state).unwrap();
    // the empty name page already matches the zeroed EEPROM
    assert_eq!(persistence.driver().storage().writes, vec![0, 256, 384, 512]);

    state.write_effect_settings(ChannelId::Effect(1), &[3; WHEEL_SIZE]);
    persistence.save(&mut state).unwrap();
    assert_eq!(
        persistence.driver().storage().writes,
        vec![0, 256, 384, 512, 384]
    );
}

#[test]
fn eeprom_round_trip() {
    let storage = EepromStorage::new(MockEeprom::new(4096), 256, STORAGE_REGION_SIZE).unwrap();
    let mut persistence = Persistence::new(storage).unwrap();
    let (mut saved, _) = engine();
    customize(&mut saved);
    persistence.save(&mut saved).unwrap();

    let (mut loaded, _) = engine();
    persistence.load(&mut loaded).unwrap();

    assert_eq!(loaded.device_state(), saved.device_state());
    assert_eq!(loaded.advertised_name(), "Rex");
    assert_eq!(persistence.driver().storage().data[256], 2);
}

// -----------------------------------------------------------------------------
// Boot
// -----------------------------------------------------------------------------

#[test]
fn boot_on_fresh_storage_publishes_defaults() {
    let (mut state, _) = engine();
    let mut persistence = flash_persistence();
    let mut peripheral = RecordingPeripheral::default();

    assert_eq!(state.boot(&mut persistence, &mut peripheral), BootSource::Defaults);

    assert_eq!(peripheral.accepts_audio, Some(false));
    assert_eq!(peripheral.local_name.as_deref(), Some("Collar"));
    assert_eq!(peripheral.effect_changes, vec![(gizmoled_engine::EffectName::Blink, None)]);
    for (i, effect) in state.registry().iter().enumerate() {
        assert_eq!(
            peripheral.last_published(ChannelId::Effect(i as u8)),
            Some(effect.default_settings())
        );
    }
    assert_eq!(
        peripheral.last_published(ChannelId::EffectSelect),
        Some(state.device_state().as_bytes())
    );
    assert_eq!(peripheral.last_published(ChannelId::FunctionCall), Some(&[0u8, 0][..]));
}

#[test]
fn boot_restores_saved_configuration() {
    let (mut saved, _) = engine();
    customize(&mut saved);
    let mut persistence = flash_persistence();
    persistence.save(&mut saved).unwrap();

    let (mut state, _) = engine();
    let mut peripheral = RecordingPeripheral::default();
    assert_eq!(state.boot(&mut persistence, &mut peripheral), BootSource::Storage);

    assert_eq!(peripheral.accepts_audio, Some(true));
    assert_eq!(peripheral.local_name.as_deref(), Some("Rex"));
    assert_eq!(
        peripheral.last_published(ChannelId::Effect(0)),
        Some(&[0xAB; 24][..])
    );
}
