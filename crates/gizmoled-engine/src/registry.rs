//! Effect registry
//!
//! Built once at boot from a declaration list. Descriptor shape (size,
//! behavior, channel) is fixed afterwards; only the settings bytes change.

use core::fmt;

use heapless::Vec;

use crate::channel::ChannelId;
use crate::config::{MAX_EFFECTS, MAX_SETTINGS_SIZE};
use crate::effect::{EffectKind, EffectName};
use crate::schema::{ParamField, SettingsView, encode_settings};

/// Compile-time description of one effect
#[derive(Debug, Clone)]
pub struct EffectDeclaration<B> {
    pub name: EffectName,
    pub kind: EffectKind,
    pub schema: &'static [ParamField],
    pub behavior: B,
}

impl<B> EffectDeclaration<B> {
    pub const fn new(
        name: EffectName,
        kind: EffectKind,
        schema: &'static [ParamField],
        behavior: B,
    ) -> Self {
        Self {
            name,
            kind,
            schema,
            behavior,
        }
    }
}

/// Registry construction error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// No effect declared
    Empty,
    /// More than [`MAX_EFFECTS`] effects declared
    TooManyEffects,
    /// The same effect name was declared twice
    DuplicateEffect(EffectName),
    /// Encoded settings do not fit into one storage page
    SettingsTooLarge(EffectName),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no effects declared"),
            Self::TooManyEffects => write!(f, "more than {} effects declared", MAX_EFFECTS),
            Self::DuplicateEffect(name) => write!(f, "effect {} declared twice", name.as_str()),
            Self::SettingsTooLarge(name) => {
                write!(f, "settings of {} exceed {} bytes", name.as_str(), MAX_SETTINGS_SIZE)
            }
        }
    }
}

/// Runtime entry of the registry
#[derive(Debug)]
pub struct EffectDescriptor<B> {
    name: EffectName,
    kind: EffectKind,
    schema: &'static [ParamField],
    settings: Vec<u8, MAX_SETTINGS_SIZE>,
    default_settings: Vec<u8, MAX_SETTINGS_SIZE>,
    channel: ChannelId,
    behavior: B,
}

impl<B> EffectDescriptor<B> {
    pub fn name(&self) -> EffectName {
        self.name
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn is_visualizer(&self) -> bool {
        self.kind == EffectKind::Visualizer
    }

    pub fn schema(&self) -> &'static [ParamField] {
        self.schema
    }

    /// Size of the settings blob in bytes
    pub fn settings_size(&self) -> usize {
        self.default_settings.len()
    }

    /// Live settings
    pub fn settings(&self) -> &[u8] {
        &self.settings
    }

    /// Settings captured at boot from the compiled-in declaration
    pub fn default_settings(&self) -> &[u8] {
        &self.default_settings
    }

    /// Live settings addressed through the schema
    pub fn settings_view(&self) -> SettingsView<'_> {
        SettingsView::new(self.schema, &self.settings)
    }

    /// Remote channel bound to this effect
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// Overwrite the settings. Refused unless `data` has exactly the settings size.
    pub(crate) fn write_settings(&mut self, data: &[u8]) -> bool {
        if data.len() != self.settings_size() {
            return false;
        }
        self.settings.copy_from_slice(data);
        true
    }

    pub(crate) fn restore_defaults(&mut self) {
        self.settings.copy_from_slice(&self.default_settings);
    }

    /// Split borrow used by the animation state machine
    pub(crate) fn parts_mut(&mut self) -> (&mut B, SettingsView<'_>) {
        (
            &mut self.behavior,
            SettingsView::new(self.schema, &self.settings),
        )
    }
}

/// Fixed-capacity table of effect descriptors
#[derive(Debug)]
pub struct EffectRegistry<B> {
    effects: Vec<EffectDescriptor<B>, MAX_EFFECTS>,
}

impl<B> EffectRegistry<B> {
    /// Build the registry, snapshotting every effect's default settings.
    ///
    /// Effect `i` is bound to [`ChannelId::Effect`]`(i)`.
    pub fn new(
        declarations: impl IntoIterator<Item = EffectDeclaration<B>>,
    ) -> Result<Self, RegistryError> {
        let mut effects: Vec<EffectDescriptor<B>, MAX_EFFECTS> = Vec::new();

        for declaration in declarations {
            if effects.iter().any(|e| e.name == declaration.name) {
                return Err(RegistryError::DuplicateEffect(declaration.name));
            }
            let settings = encode_settings(declaration.schema)
                .map_err(|_| RegistryError::SettingsTooLarge(declaration.name))?;

            let descriptor = EffectDescriptor {
                name: declaration.name,
                kind: declaration.kind,
                schema: declaration.schema,
                default_settings: settings.clone(),
                settings,
                channel: ChannelId::Effect(effects.len() as u8),
                behavior: declaration.behavior,
            };
            effects
                .push(descriptor)
                .map_err(|_| RegistryError::TooManyEffects)?;
        }

        if effects.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Self { effects })
    }

    pub fn count(&self) -> usize {
        self.effects.len()
    }

    pub fn get(&self, index: usize) -> Option<&EffectDescriptor<B>> {
        self.effects.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut EffectDescriptor<B>> {
        self.effects.get_mut(index)
    }

    /// Index of the effect bound to `channel`
    pub fn position_by_channel(&self, channel: ChannelId) -> Option<usize> {
        self.effects.iter().position(|e| e.channel == channel)
    }

    pub fn find_by_channel(&self, channel: ChannelId) -> Option<&EffectDescriptor<B>> {
        self.effects.iter().find(|e| e.channel == channel)
    }

    pub(crate) fn find_by_channel_mut(
        &mut self,
        channel: ChannelId,
    ) -> Option<&mut EffectDescriptor<B>> {
        self.effects.iter_mut().find(|e| e.channel == channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectDescriptor<B>> {
        self.effects.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut EffectDescriptor<B>> {
        self.effects.iter_mut()
    }
}
