//! Engine state aggregate
//!
//! [`EngineState`] owns everything the control loop mutates: the effect
//! registry, the persisted selection record and name, and the transient audio,
//! function call and timer state. Protocol handlers (`protocol`), the frame
//! state machine (`animation`) and persistence all operate on it by reference.

use log::{info, warn};

use crate::animation::AnimationPhase;
use crate::channel::ChannelId;
use crate::config::{EngineConfig, MAX_EFFECTS};
use crate::peripheral::Peripheral;
use crate::persistence::{Persistence, PersistenceError};
use crate::registry::{EffectDescriptor, EffectRegistry};
use crate::state::{AudioActivity, DeviceName, DeviceState, DirtyTimer, FunctionCallState};
use crate::storage::StorageDriver;

/// Where the boot configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootSource {
    /// Valid record found in storage
    Storage,
    /// First boot, erased or corrupt storage: compiled-in defaults
    Defaults,
}

/// Mutable state of the effect engine
#[derive(Debug)]
pub struct EngineState<B> {
    pub(crate) config: EngineConfig,
    pub(crate) registry: EffectRegistry<B>,
    pub(crate) device: DeviceState,
    pub(crate) name: DeviceName,
    pub(crate) audio: AudioActivity,
    pub(crate) function_call: FunctionCallState,
    pub(crate) dirty: DirtyTimer,
    /// Seconds left of the connection transition
    pub(crate) connection_timer: f32,
    pub(crate) phase: AnimationPhase,
}

impl<B> EngineState<B> {
    /// Create the engine state with compiled-in defaults
    pub fn new(registry: EffectRegistry<B>, config: EngineConfig) -> Self {
        let mut state = Self {
            config,
            registry,
            device: DeviceState::new(),
            name: DeviceName::new(),
            audio: AudioActivity::new(),
            function_call: FunctionCallState::new(),
            dirty: DirtyTimer::new(),
            connection_timer: 0.0,
            phase: AnimationPhase::Idle,
        };
        state.sync_registry_identity();
        state
    }

    /// Load the stored configuration and publish the initial channel values.
    ///
    /// Any storage problem falls back to the compiled-in defaults.
    pub fn boot<S: StorageDriver, P: Peripheral>(
        &mut self,
        persistence: &mut Persistence<S>,
        peripheral: &mut P,
    ) -> BootSource {
        let source = match persistence.load(self) {
            Ok(()) => {
                info!("engine: loaded configuration from storage");
                BootSource::Storage
            }
            Err(PersistenceError::InvalidMagicHeader) => {
                info!("engine: no stored configuration, using defaults");
                BootSource::Defaults
            }
            Err(err) => {
                warn!("engine: failed to load configuration: {}", err);
                BootSource::Defaults
            }
        };

        self.publish_initial_values(peripheral);
        source
    }

    fn publish_initial_values<P: Peripheral>(&self, peripheral: &mut P) {
        for effect in self.registry.iter() {
            peripheral.publish(effect.channel(), effect.settings());
        }
        peripheral.publish(ChannelId::EffectSelect, self.device.as_bytes());
        peripheral.publish(ChannelId::FunctionCall, &self.function_call.header());
        peripheral.set_local_name(self.advertised_name());
        peripheral.set_accepts_audio(self.accepts_audio());

        if let Some(effect) = self.selected_effect() {
            peripheral.effect_changed(effect.name(), None);
        }
    }

    /// Refresh the registry-derived part of the device state.
    ///
    /// The effect count and identity list always come from the running
    /// firmware; selections that no longer exist are reset to the first effect.
    pub(crate) fn sync_registry_identity(&mut self) {
        let count = self.registry.count();
        self.device.number_of_effects = count as u8;
        self.device.effect_names = [0; MAX_EFFECTS];
        for (slot, effect) in self.device.effect_names.iter_mut().zip(self.registry.iter()) {
            *slot = effect.name().as_u8();
        }

        if usize::from(self.device.selected_effect) >= count {
            warn!(
                "engine: stored effect {} out of range, selecting 0",
                self.device.selected_effect
            );
            self.device.selected_effect = 0;
        }
        if usize::from(self.device.selected_effect_secondary) >= count {
            self.device.selected_effect_secondary = 0;
        }
    }

    /// Arm the persistence debounce
    pub(crate) fn mark_dirty(&mut self) {
        self.dirty.arm(self.config.settings_debounce);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &EffectRegistry<B> {
        &self.registry
    }

    pub fn device_state(&self) -> &DeviceState {
        &self.device
    }

    pub fn device_name(&self) -> &DeviceName {
        &self.name
    }

    pub fn audio(&self) -> &AudioActivity {
        &self.audio
    }

    pub fn function_call_state(&self) -> &FunctionCallState {
        &self.function_call
    }

    pub fn dirty_timer(&self) -> &DirtyTimer {
        &self.dirty
    }

    /// Phase chosen by the last animated frame
    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn is_connection_transition_running(&self) -> bool {
        self.connection_timer > 0.0
    }

    pub fn selected_effect(&self) -> Option<&EffectDescriptor<B>> {
        self.registry.get(usize::from(self.device.selected_effect))
    }

    /// Whether the device currently advertises audio input support
    pub fn accepts_audio(&self) -> bool {
        self.selected_effect()
            .is_some_and(EffectDescriptor::is_visualizer)
    }

    /// Name to advertise: the stored name, or the compiled-in default
    pub fn advertised_name(&self) -> &str {
        if self.name.is_empty() {
            self.config.default_device_name
        } else {
            self.name.as_str()
        }
    }

    /// Transport poll interval for the current selection
    pub fn poll_interval(&self) -> f32 {
        if self.accepts_audio() {
            self.config.poll_interval_visualizer
        } else {
            self.config.poll_interval
        }
    }
}
