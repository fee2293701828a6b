//! Shared mocks for the engine integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use embedded_storage::nor_flash::{ErrorType, NorFlash, NorFlashErrorKind, ReadNorFlash};
use embedded_storage::{ReadStorage, Storage};
use gizmoled_engine::effect::{BLINK_SETTINGS, VISUALIZER_SETTINGS, WHEEL_SETTINGS};
use gizmoled_engine::{
    ChannelId, ConnectionAnimation, EffectBehavior, EffectDeclaration, EffectKind, EffectName,
    EffectRegistry, EngineConfig, EngineState, Frame, LedDriver, NorFlashStorage, Peripheral,
    Persistence,
};
use smart_leds::RGB8;

pub const LEDS: usize = 8;

/// Settings sizes of the three test effects
pub const BLINK_SIZE: usize = 24;
pub const WHEEL_SIZE: usize = 15;
pub const VU_SIZE: usize = 20;

// -----------------------------------------------------------------------------
// Effects
// -----------------------------------------------------------------------------

/// Shared log of animated effect ids
pub type AnimationLog = Rc<RefCell<Vec<usize>>>;

/// Behavior recording every frame it renders
#[derive(Debug, Clone)]
pub struct Recorder {
    pub id: usize,
    pub log: AnimationLog,
}

impl<const N: usize> EffectBehavior<N> for Recorder {
    fn animate(&mut self, frame: Frame<'_, N>) {
        self.log.borrow_mut().push(self.id);
        let value = self.id as u8 + 1;
        frame.pixels.fill(RGB8::new(value, value, value));
    }
}

/// Blink, Wheel and a VU visualizer, in this order
pub fn declarations(log: &AnimationLog) -> [EffectDeclaration<Recorder>; 3] {
    let recorder = |id| Recorder {
        id,
        log: Rc::clone(log),
    };
    [
        EffectDeclaration::new(EffectName::Blink, EffectKind::Default, BLINK_SETTINGS, recorder(0)),
        EffectDeclaration::new(EffectName::Wheel, EffectKind::Default, WHEEL_SETTINGS, recorder(1)),
        EffectDeclaration::new(
            EffectName::Visualizer,
            EffectKind::Visualizer,
            VISUALIZER_SETTINGS,
            recorder(2),
        ),
    ]
}

pub fn registry(log: &AnimationLog) -> EffectRegistry<Recorder> {
    EffectRegistry::new(declarations(log)).expect("valid registry")
}

/// Timers with exactly representable values
pub fn test_config() -> EngineConfig {
    EngineConfig::new()
        .with_settings_debounce(5.0)
        .with_audio_hold(1.0)
        .with_connection_transition(1.0)
}

pub fn engine() -> (EngineState<Recorder>, AnimationLog) {
    let log = AnimationLog::default();
    let state = EngineState::new(registry(&log), test_config());
    (state, log)
}

/// Transition animation recording its progress values
#[derive(Debug, Default)]
pub struct TransitionRecorder {
    pub progress: Vec<f32>,
}

impl<const N: usize> ConnectionAnimation<N> for TransitionRecorder {
    fn animate(&mut self, pixels: &mut [RGB8; N], _delta: f32, progress: f32) {
        self.progress.push(progress);
        pixels.fill(RGB8::new(255, 255, 255));
    }
}

#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub frames: Vec<Vec<RGB8>>,
}

impl<const N: usize> LedDriver<N> for RecordingDriver {
    fn write(&mut self, pixels: &[RGB8; N]) {
        self.frames.push(pixels.to_vec());
    }
}

// -----------------------------------------------------------------------------
// Transport
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RecordingPeripheral {
    pub accepts_audio: Option<bool>,
    pub local_name: Option<String>,
    pub published: Vec<(ChannelId, Vec<u8>)>,
    pub effect_changes: Vec<(EffectName, Option<EffectName>)>,
}

impl RecordingPeripheral {
    /// Last value published on `channel`
    pub fn last_published(&self, channel: ChannelId) -> Option<&[u8]> {
        self.published
            .iter()
            .rev()
            .find(|(c, _)| *c == channel)
            .map(|(_, value)| value.as_slice())
    }

    pub fn publish_count(&self, channel: ChannelId) -> usize {
        self.published.iter().filter(|(c, _)| *c == channel).count()
    }
}

impl Peripheral for RecordingPeripheral {
    fn set_accepts_audio(&mut self, accepts: bool) {
        self.accepts_audio = Some(accepts);
    }

    fn set_local_name(&mut self, name: &str) {
        self.local_name = Some(name.to_string());
    }

    fn publish(&mut self, channel: ChannelId, value: &[u8]) {
        self.published.push((channel, value.to_vec()));
    }

    fn effect_changed(&mut self, current: EffectName, previous: Option<EffectName>) {
        self.effect_changes.push((current, previous));
    }
}

// -----------------------------------------------------------------------------
// Storage
// -----------------------------------------------------------------------------

pub const FLASH_SIZE: usize = 16 * 1024;
pub const SECTOR_SIZE: usize = 4096;

/// In-memory NOR flash, erased to `0xFF`
#[derive(Debug)]
pub struct MockFlash {
    pub data: Vec<u8>,
    pub writes: usize,
    pub erases: usize,
    pub fail: bool,
}

impl MockFlash {
    pub fn new() -> Self {
        Self {
            data: vec![0xFF; FLASH_SIZE],
            writes: 0,
            erases: 0,
            fail: false,
        }
    }
}

impl ErrorType for MockFlash {
    type Error = NorFlashErrorKind;
}

impl ReadNorFlash for MockFlash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let end = start + bytes.len();
        if self.fail || end > self.data.len() {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        bytes.copy_from_slice(&self.data[start..end]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl NorFlash for MockFlash {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = SECTOR_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if self.fail {
            return Err(NorFlashErrorKind::Other);
        }
        if from as usize % SECTOR_SIZE != 0 || to as usize % SECTOR_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        self.data[from as usize..to as usize].fill(0xFF);
        self.erases += 1;
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(NorFlashErrorKind::Other);
        }
        let start = offset as usize;
        for (cell, byte) in self.data[start..start + bytes.len()].iter_mut().zip(bytes) {
            // NOR writes can only clear bits
            *cell &= *byte;
        }
        self.writes += 1;
        Ok(())
    }
}

/// In-memory EEPROM, zeroed
#[derive(Debug)]
pub struct MockEeprom {
    pub data: Vec<u8>,
    /// Offsets of every write call
    pub writes: Vec<u32>,
}

impl MockEeprom {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            writes: Vec::new(),
        }
    }
}

impl ReadStorage for MockEeprom {
    type Error = ();

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let data = self.data.get(start..start + bytes.len()).ok_or(())?;
        bytes.copy_from_slice(data);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl Storage for MockEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let data = self.data.get_mut(start..start + bytes.len()).ok_or(())?;
        data.copy_from_slice(bytes);
        self.writes.push(offset);
        Ok(())
    }
}

pub type FlashPersistence = Persistence<NorFlashStorage<MockFlash>>;

/// Persistence on the first sector of a fresh flash
pub fn flash_persistence() -> FlashPersistence {
    persistence_on(MockFlash::new())
}

pub fn persistence_on(flash: MockFlash) -> FlashPersistence {
    let storage = NorFlashStorage::new(flash, 0, SECTOR_SIZE).expect("aligned region");
    Persistence::new(storage).expect("region large enough")
}

pub fn flash(persistence: &FlashPersistence) -> &MockFlash {
    persistence.driver().flash()
}
