//! Compile-time limits and runtime engine configuration

use embassy_time::Duration;

/// Maximum number of effects the registry and the storage layout can hold
pub const MAX_EFFECTS: usize = 24;

/// Number of audio bands carried by the activity bitmask
pub const NUM_AUDIO_BANDS: usize = 6;

/// Storage page size. Every persisted section starts on a page boundary.
pub const PAGE_SIZE: usize = 128;

/// Largest settings blob a single effect may declare (one storage page)
pub const MAX_SETTINGS_SIZE: usize = PAGE_SIZE;

/// Device name capacity, terminator included
pub const MAX_DEVICE_NAME: usize = 32;

/// Maximum number of argument bytes following the function call header
pub const MAX_FUNCTION_ARGS: usize = 32;

/// Frame deltas are clamped to this value to absorb stalls (debugger, flash writes)
pub const MAX_FRAME_DELTA: f32 = 0.999;

/// Default frames per second
pub const DEFAULT_FPS: u64 = 60;

/// Name advertised while no custom name is stored
pub const DEFAULT_DEVICE_NAME: &str = "Collar";

/// Seconds between the last persisted-state change and the storage write
const SETTINGS_DEBOUNCE_SECONDS: f32 = 5.0;
/// Seconds a visualizer keeps rendering after the last active audio band
const AUDIO_HOLD_SECONDS: f32 = 10.0;
/// Length of the "peer connected" animation
const CONNECTION_TRANSITION_SECONDS: f32 = 1.5;
/// Transport poll interval for regular effects
const POLL_INTERVAL_SECONDS: f32 = 0.1;
/// Transport poll interval while a visualizer is selected (every frame)
const POLL_INTERVAL_VISUALIZER_SECONDS: f32 = 0.0;

/// Runtime configuration of the effect engine.
///
/// Timers are expressed in seconds to match the frame delta handed to effects.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Debounce window for storage writes
    pub settings_debounce: f32,
    /// Audio hold time for visualizer effects
    pub audio_hold: f32,
    /// Duration of the connection transition animation
    pub connection_transition: f32,
    /// Frame budget of the control loop
    pub frame_duration: Duration,
    /// Transport poll interval for regular effects
    pub poll_interval: f32,
    /// Transport poll interval while a visualizer is selected
    pub poll_interval_visualizer: f32,
    /// Compiled-in device name
    pub default_device_name: &'static str,
}

impl EngineConfig {
    pub const fn new() -> Self {
        Self {
            settings_debounce: SETTINGS_DEBOUNCE_SECONDS,
            audio_hold: AUDIO_HOLD_SECONDS,
            connection_transition: CONNECTION_TRANSITION_SECONDS,
            frame_duration: Duration::from_millis(1000 / DEFAULT_FPS),
            poll_interval: POLL_INTERVAL_SECONDS,
            poll_interval_visualizer: POLL_INTERVAL_VISUALIZER_SECONDS,
            default_device_name: DEFAULT_DEVICE_NAME,
        }
    }

    /// Set the storage debounce window
    #[must_use]
    pub const fn with_settings_debounce(mut self, seconds: f32) -> Self {
        self.settings_debounce = seconds;
        self
    }

    /// Set the visualizer audio hold time
    #[must_use]
    pub const fn with_audio_hold(mut self, seconds: f32) -> Self {
        self.audio_hold = seconds;
        self
    }

    /// Set the connection transition duration
    #[must_use]
    pub const fn with_connection_transition(mut self, seconds: f32) -> Self {
        self.connection_transition = seconds;
        self
    }

    /// Set the target frame rate. Zero is treated as 1 FPS.
    #[must_use]
    pub const fn with_fps(mut self, fps: u64) -> Self {
        let fps = if fps == 0 { 1 } else { fps };
        self.frame_duration = Duration::from_millis(1000 / fps);
        self
    }

    /// Set the transport poll intervals (regular, visualizer)
    #[must_use]
    pub const fn with_poll_intervals(mut self, regular: f32, visualizer: f32) -> Self {
        self.poll_interval = regular;
        self.poll_interval_visualizer = visualizer;
        self
    }

    /// Set the compiled-in device name
    #[must_use]
    pub const fn with_default_device_name(mut self, name: &'static str) -> Self {
        self.default_device_name = name;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
