//! Mutable device state owned by the engine

use bytemuck::{Pod, Zeroable};
use heapless::Vec;

use crate::config::{MAX_DEVICE_NAME, MAX_EFFECTS, MAX_FUNCTION_ARGS, NUM_AUDIO_BANDS};

/// Marker stored in [`DeviceState::is_initialized`] once the record was saved.
///
/// Neither erased flash (`0xFF`) nor zeroed memory can match it.
pub const INITIALIZED_MARKER: u8 = 0xA5;

/// Persisted effect selection record.
///
/// Also published on the effect selection channel so the companion app can
/// read the effect count and identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroable, Pod)]
#[repr(C)]
pub struct DeviceState {
    pub selected_effect: u8,
    pub selected_effect_secondary: u8,
    pub number_of_effects: u8,
    pub effect_names: [u8; MAX_EFFECTS],
    pub is_initialized: u8,
}

impl DeviceState {
    pub const fn new() -> Self {
        Self {
            selected_effect: 0,
            selected_effect_secondary: 0,
            number_of_effects: 0,
            effect_names: [0; MAX_EFFECTS],
            is_initialized: 0,
        }
    }

    pub const fn is_initialized(&self) -> bool {
        self.is_initialized == INITIALIZED_MARKER
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

/// User-assigned device name.
///
/// Holds at most `MAX_DEVICE_NAME - 1` bytes so the stored form always keeps a
/// terminating zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceName {
    bytes: Vec<u8, MAX_DEVICE_NAME>,
}

impl DeviceName {
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Maximum name length in bytes
    pub const fn capacity() -> usize {
        MAX_DEVICE_NAME - 1
    }

    /// Replace the name, stopping at the first zero byte and truncating to
    /// [`Self::capacity`]
    pub fn set(&mut self, name: &[u8]) {
        let name = name.iter().position(|&b| b == 0).map_or(name, |end| &name[..end]);
        let len = name.len().min(Self::capacity());
        self.bytes.clear();
        // len never exceeds the capacity
        let _ = self.bytes.extend_from_slice(&name[..len]);
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Longest valid UTF-8 prefix of the name
    pub fn as_str(&self) -> &str {
        match core::str::from_utf8(&self.bytes) {
            Ok(name) => name,
            Err(err) => core::str::from_utf8(&self.bytes[..err.valid_up_to()]).unwrap_or_default(),
        }
    }

    /// Zero-padded storage form
    pub fn to_storage(&self) -> [u8; MAX_DEVICE_NAME] {
        let mut out = [0u8; MAX_DEVICE_NAME];
        out[..self.bytes.len()].copy_from_slice(&self.bytes);
        out
    }

    /// Parse the storage form, stopping at the first zero byte
    pub fn from_storage(data: &[u8]) -> Self {
        let mut name = Self::new();
        name.set(data);
        name
    }
}

/// Audio band activity received from the companion app. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct AudioActivity {
    bands: [bool; NUM_AUDIO_BANDS],
    hold: f32,
}

impl AudioActivity {
    pub const fn new() -> Self {
        Self {
            bands: [false; NUM_AUDIO_BANDS],
            hold: 0.0,
        }
    }

    /// Apply a band bitmask, bit `i` activates band `i`.
    ///
    /// Any active band restarts the hold timer. Returns whether any band is active.
    pub fn apply_mask(&mut self, mask: u8, hold_seconds: f32) -> bool {
        let mut any_active = false;
        for (i, band) in self.bands.iter_mut().enumerate() {
            *band = (mask >> i) & 0x1 != 0;
            any_active |= *band;
        }
        if any_active {
            self.hold = hold_seconds;
        }
        any_active
    }

    pub fn is_band_active(&self, band: usize) -> bool {
        self.bands.get(band).copied().unwrap_or(false)
    }

    /// Band level for visualizers (0.0 or 1.0)
    pub fn level(&self, band: usize) -> f32 {
        if self.is_band_active(band) { 1.0 } else { 0.0 }
    }

    /// Seconds left before a visualizer yields to its fallback
    pub fn hold_remaining(&self) -> f32 {
        self.hold
    }

    /// Whether a visualizer still has a signal to show
    pub fn has_signal(&self) -> bool {
        self.hold > 0.0
    }

    /// Consume `delta` seconds of hold time, floored at zero
    pub(crate) fn decay(&mut self, delta: f32) -> f32 {
        if self.hold > 0.0 {
            self.hold -= delta;
        }
        if self.hold < 0.0 {
            self.hold = 0.0;
        }
        self.hold
    }
}

/// Size of the function call header: trigger byte and opcode
pub const FUNCTION_CALL_HEADER_SIZE: usize = 2;

/// Edge-detection state of the function call channel. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct FunctionCallState {
    trigger: u8,
    opcode: u8,
    args: Vec<u8, MAX_FUNCTION_ARGS>,
}

impl FunctionCallState {
    pub const fn new() -> Self {
        Self {
            trigger: 0,
            opcode: 0,
            args: Vec::new(),
        }
    }

    pub fn trigger(&self) -> u8 {
        self.trigger
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn args(&self) -> &[u8] {
        &self.args
    }

    /// Header as published on the function call channel
    pub fn header(&self) -> [u8; FUNCTION_CALL_HEADER_SIZE] {
        [self.trigger, self.opcode]
    }

    /// Record a call. Returns `false` when the trigger did not change.
    pub(crate) fn accept(&mut self, trigger: u8, opcode: u8, args: &[u8]) -> bool {
        if trigger == self.trigger {
            return false;
        }
        self.trigger = trigger;
        self.opcode = opcode;
        self.args.clear();
        let len = args.len().min(MAX_FUNCTION_ARGS);
        let _ = self.args.extend_from_slice(&args[..len]);
        true
    }

    /// Forget the last trigger so the next call from a new peer always runs
    pub(crate) fn reset_trigger(&mut self) {
        self.trigger = 0;
    }
}

/// Countdown coalescing persisted-state changes into one storage write
#[derive(Debug, Clone, Copy, Default)]
pub struct DirtyTimer {
    remaining: f32,
}

impl DirtyTimer {
    pub const fn new() -> Self {
        Self { remaining: 0.0 }
    }

    /// (Re)start the countdown. A zero window fires on the next tick.
    pub fn arm(&mut self, seconds: f32) {
        self.remaining = seconds.max(f32::EPSILON);
    }

    pub fn is_armed(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Advance the countdown. Returns `true` exactly once, on the frame it elapses.
    pub fn tick(&mut self, delta: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining -= delta;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            return true;
        }
        false
    }
}
