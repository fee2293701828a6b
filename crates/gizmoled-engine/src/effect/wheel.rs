//! Color wheel effect
//!
//! Spreads the hue circle along the strip and rotates it.

use smart_leds::hsv::{Hsv, hsv2rgb};

use super::{EffectBehavior, Frame, advance_cycle, hue8};
use crate::schema::{ParamField, VarName};

/// Compiled-in color wheel parameters
pub const WHEEL_SETTINGS: &[ParamField] = &[
    ParamField::slider(VarName::Brightness, 255, 0, 255),
    ParamField::slider(VarName::Speed, 5, 1, 100),
    ParamField::slider(VarName::Length, 10, 1, 50),
];

#[derive(Debug, Clone, Default)]
pub struct ColorWheelEffect {
    timer: f32,
}

impl<const N: usize> EffectBehavior<N> for ColorWheelEffect {
    fn animate(&mut self, frame: Frame<'_, N>) {
        let settings = frame.settings;
        let brightness = settings.slider_or(VarName::Brightness, 255);
        let speed = f32::from(settings.slider_or(VarName::Speed, 5));
        // number of hue circles along the strip, in tenths
        let width = f32::from(settings.slider_or(VarName::Length, 10)) / 10.0;

        advance_cycle(&mut self.timer, frame.delta * speed / 10.0);

        // Divide by N, not N - 1, so 0 and 360 degrees are not duplicated
        for (i, pixel) in frame.pixels.iter_mut().enumerate() {
            let position = i as f32 / N as f32;
            *pixel = hsv2rgb(Hsv {
                hue: hue8(self.timer + position * width),
                sat: 255,
                val: brightness,
            });
        }
    }
}
