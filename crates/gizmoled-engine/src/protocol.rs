//! Command protocol handlers
//!
//! Every handler validates the whole write before touching any state. A
//! malformed write is dropped with a debug log and leaves the engine as it
//! was; handlers report whether the write was applied.

use log::{debug, info};

use crate::channel::{BusEvent, ChannelId};
use crate::config::MAX_FUNCTION_ARGS;
use crate::engine::EngineState;
use crate::peripheral::Peripheral;
use crate::state::FUNCTION_CALL_HEADER_SIZE;

/// Opcode restoring one effect's default settings
pub const OPCODE_RESET_SETTINGS: u8 = 0;
/// Opcode renaming the device
pub const OPCODE_RENAME_DEVICE: u8 = 1;

/// Decoded function call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCall<'a> {
    /// Restore the settings of the effect at the given index
    ResetSettings(u8),
    /// Rename the device, an empty name restores the default
    RenameDevice(&'a [u8]),
}

impl<'a> FunctionCall<'a> {
    /// Decode an opcode and its arguments
    pub fn parse(opcode: u8, args: &'a [u8]) -> Option<Self> {
        match opcode {
            OPCODE_RESET_SETTINGS => args.first().map(|&index| Self::ResetSettings(index)),
            OPCODE_RENAME_DEVICE => Some(Self::RenameDevice(args)),
            _ => None,
        }
    }
}

impl<B> EngineState<B> {
    /// Dispatch one transport event to its handler
    pub fn handle_event<P: Peripheral>(&mut self, event: &BusEvent, peripheral: &mut P) -> bool {
        match event {
            BusEvent::Connected => {
                self.on_connected();
                true
            }
            BusEvent::Disconnected => {
                self.on_disconnected();
                true
            }
            BusEvent::Write { channel, payload } => match channel {
                ChannelId::Effect(_) => self.write_effect_settings(*channel, payload),
                ChannelId::EffectSelect => match payload.first() {
                    Some(&index) => self.select_effect(usize::from(index), peripheral),
                    None => {
                        debug!("protocol: empty effect selection dropped");
                        false
                    }
                },
                ChannelId::AudioActivity => self.write_audio_activity(payload),
                ChannelId::FunctionCall => self.function_call(payload, peripheral),
            },
        }
    }

    /// Select the effect at `index`
    pub fn select_effect<P: Peripheral>(&mut self, index: usize, peripheral: &mut P) -> bool {
        let Some(effect) = self.registry.get(index) else {
            debug!("protocol: effect index {} out of range", index);
            return false;
        };
        let current = effect.name();
        let is_visualizer = effect.is_visualizer();
        let previous = self.selected_effect().map(|e| e.name());

        // index < count <= MAX_EFFECTS
        self.device.selected_effect = index as u8;
        if !is_visualizer {
            self.device.selected_effect_secondary = index as u8;
        }
        info!("protocol: selected effect {} ({})", index, current.as_str());

        peripheral.publish(ChannelId::EffectSelect, self.device.as_bytes());
        peripheral.set_accepts_audio(is_visualizer);
        self.mark_dirty();
        peripheral.effect_changed(current, previous);
        true
    }

    /// Replace the settings of the effect bound to `channel`.
    ///
    /// The payload must have exactly the effect's settings size.
    pub fn write_effect_settings(&mut self, channel: ChannelId, payload: &[u8]) -> bool {
        let Some(effect) = self.registry.find_by_channel_mut(channel) else {
            debug!("protocol: settings write to unbound channel {:?}", channel);
            return false;
        };
        if !effect.write_settings(payload) {
            debug!(
                "protocol: settings of {} expect {} bytes, got {}",
                effect.name().as_str(),
                effect.settings_size(),
                payload.len()
            );
            return false;
        }
        self.mark_dirty();
        true
    }

    /// Apply an audio band bitmask. The payload must be a single byte.
    pub fn write_audio_activity(&mut self, payload: &[u8]) -> bool {
        let &[mask] = payload else {
            debug!("protocol: audio activity expects 1 byte, got {}", payload.len());
            return false;
        };
        self.audio.apply_mask(mask, self.config.audio_hold);
        true
    }

    /// Handle a function call write: `[trigger, opcode, args...]`.
    ///
    /// Only a trigger byte different from the last one runs the call. A new
    /// trigger with an unknown opcode or missing arguments is consumed without
    /// effect.
    pub fn function_call<P: Peripheral>(&mut self, payload: &[u8], peripheral: &mut P) -> bool {
        let Some((&[trigger, opcode], args)) =
            payload.split_first_chunk::<FUNCTION_CALL_HEADER_SIZE>()
        else {
            debug!("protocol: function call header truncated");
            return false;
        };
        if args.len() > MAX_FUNCTION_ARGS {
            debug!("protocol: function call carries {} argument bytes", args.len());
            return false;
        }
        if !self.function_call.accept(trigger, opcode, args) {
            return false;
        }

        match FunctionCall::parse(opcode, args) {
            Some(FunctionCall::ResetSettings(index)) => {
                self.reset_settings(usize::from(index), peripheral)
            }
            Some(FunctionCall::RenameDevice(name)) => {
                self.rename_device(name, peripheral);
                true
            }
            None => {
                debug!("protocol: unknown function call {} ({} args)", opcode, args.len());
                false
            }
        }
    }

    fn reset_settings<P: Peripheral>(&mut self, index: usize, peripheral: &mut P) -> bool {
        let Some(effect) = self.registry.get_mut(index) else {
            debug!("protocol: reset of unknown effect {}", index);
            return false;
        };
        effect.restore_defaults();
        peripheral.publish(effect.channel(), effect.settings());
        info!("protocol: restored defaults of {}", effect.name().as_str());
        self.mark_dirty();
        true
    }

    fn rename_device<P: Peripheral>(&mut self, name: &[u8], peripheral: &mut P) {
        // an empty name, or one starting with a zero byte, restores the default
        self.name.set(name);
        info!("protocol: device name set to \"{}\"", self.advertised_name());
        peripheral.set_local_name(self.advertised_name());
        self.mark_dirty();
    }

    /// A peer connected: greet it and forget the previous peer's trigger
    pub fn on_connected(&mut self) {
        info!("protocol: peer connected");
        self.connection_timer = self.config.connection_transition;
        self.function_call.reset_trigger();
    }

    pub fn on_disconnected(&mut self) {
        info!("protocol: peer disconnected");
    }
}
