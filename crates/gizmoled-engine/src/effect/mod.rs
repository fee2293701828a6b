//! Effect identities and animation behaviors
//!
//! Effects are looked up through the registry and animated through the
//! [`EffectBehavior`] trait. The built-in effects are stored in the
//! [`BuiltinEffect`] enum to avoid heap allocations and trait objects.

mod blink;
mod connection;
mod visualizer;
mod wheel;

pub use blink::{BLINK_SETTINGS, BlinkEffect};
pub use connection::ConnectionPulse;
pub use visualizer::{VISUALIZER_SETTINGS, VisualizerEffect};
pub use wheel::{ColorWheelEffect, WHEEL_SETTINGS};

use smart_leds::RGB8;

use crate::registry::EffectDeclaration;
use crate::schema::SettingsView;
use crate::state::AudioActivity;

/// Effect identifiers shared with the companion app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EffectName {
    Blink = 0,
    Wheel,
    Opaque,
    Gradient,
    Test,
    Visualizer,
    Pulse,
    Sparkle,
    Christmas,
    Acceleration,
    NoiseLevel,
    Empty,
    Waves,
    Drops,
    Meteor,
    Wipe,
    Fire,
}

impl EffectName {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Blink,
            1 => Self::Wheel,
            2 => Self::Opaque,
            3 => Self::Gradient,
            4 => Self::Test,
            5 => Self::Visualizer,
            6 => Self::Pulse,
            7 => Self::Sparkle,
            8 => Self::Christmas,
            9 => Self::Acceleration,
            10 => Self::NoiseLevel,
            11 => Self::Empty,
            12 => Self::Waves,
            13 => Self::Drops,
            14 => Self::Meteor,
            15 => Self::Wipe,
            16 => Self::Fire,
            _ => return None,
        })
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blink => "blink",
            Self::Wheel => "wheel",
            Self::Opaque => "opaque",
            Self::Gradient => "gradient",
            Self::Test => "test",
            Self::Visualizer => "visualizer",
            Self::Pulse => "pulse",
            Self::Sparkle => "sparkle",
            Self::Christmas => "christmas",
            Self::Acceleration => "acceleration",
            Self::NoiseLevel => "noise_level",
            Self::Empty => "empty",
            Self::Waves => "waves",
            Self::Drops => "drops",
            Self::Meteor => "meteor",
            Self::Wipe => "wipe",
            Self::Fire => "fire",
        }
    }
}

/// Effect kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Renders unconditionally
    Default,
    /// Renders only while audio activity is present, otherwise yields to the
    /// fallback effect
    Visualizer,
}

/// Everything an effect sees while rendering one frame
pub struct Frame<'a, const N: usize> {
    /// Shared pixel buffer
    pub pixels: &'a mut [RGB8; N],
    /// Live settings of the effect
    pub settings: SettingsView<'a>,
    /// Current audio band activity
    pub audio: &'a AudioActivity,
    /// Seconds since the previous frame
    pub delta: f32,
}

/// Per-effect animation behavior
///
/// Called at most once per frame, only for the effect that is on screen.
pub trait EffectBehavior<const N: usize> {
    /// Render a single frame into `frame.pixels`
    fn animate(&mut self, frame: Frame<'_, N>);
}

/// Animation shown while a freshly connected peer is greeted
pub trait ConnectionAnimation<const N: usize> {
    /// Render one transition frame, `progress` runs from 0.0 to 1.0
    fn animate(&mut self, pixels: &mut [RGB8; N], delta: f32, progress: f32);
}

/// Built-in effect slot
#[derive(Debug, Clone)]
pub enum BuiltinEffect {
    Blink(BlinkEffect),
    Wheel(ColorWheelEffect),
    Visualizer(VisualizerEffect),
}

impl<const N: usize> EffectBehavior<N> for BuiltinEffect {
    fn animate(&mut self, frame: Frame<'_, N>) {
        match self {
            Self::Blink(effect) => effect.animate(frame),
            Self::Wheel(effect) => effect.animate(frame),
            Self::Visualizer(effect) => effect.animate(frame),
        }
    }
}

/// Declarations of the built-in effects, in storage order
pub fn builtin_declarations() -> [EffectDeclaration<BuiltinEffect>; 3] {
    [
        EffectDeclaration::new(
            EffectName::Blink,
            EffectKind::Default,
            BLINK_SETTINGS,
            BuiltinEffect::Blink(BlinkEffect::default()),
        ),
        EffectDeclaration::new(
            EffectName::Wheel,
            EffectKind::Default,
            WHEEL_SETTINGS,
            BuiltinEffect::Wheel(ColorWheelEffect::default()),
        ),
        EffectDeclaration::new(
            EffectName::Visualizer,
            EffectKind::Visualizer,
            VISUALIZER_SETTINGS,
            BuiltinEffect::Visualizer(VisualizerEffect::default()),
        ),
    ]
}

/// Advance a cyclic timer and keep it in `[0, 1)`
pub(crate) fn advance_cycle(timer: &mut f32, step: f32) {
    *timer += step;
    while *timer >= 1.0 {
        *timer -= 1.0;
    }
    if *timer < 0.0 {
        *timer = 0.0;
    }
}

/// Fractional part of a non-negative value
pub(crate) fn fract(value: f32) -> f32 {
    value - (value as u32) as f32
}

/// Scale a color by a brightness factor in `[0, 1]`
pub(crate) fn scale_color(color: RGB8, factor: f32) -> RGB8 {
    let factor = factor.clamp(0.0, 1.0);
    RGB8 {
        r: (f32::from(color.r) * factor) as u8,
        g: (f32::from(color.g) * factor) as u8,
        b: (f32::from(color.b) * factor) as u8,
    }
}

/// Hue from a cycle fraction in `[0, 1)`
pub(crate) fn hue8(fraction: f32) -> u8 {
    (fract(fraction) * 256.0) as u8
}
