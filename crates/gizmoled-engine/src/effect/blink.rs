//! Blink effect
//!
//! Whole strip pulses in one color, with optional fades and a rainbow mode.

use smart_leds::hsv::{Hsv, hsv2rgb};

use super::{EffectBehavior, Frame, advance_cycle, hue8, scale_color};
use crate::schema::{ParamField, VarName};

/// Compiled-in blink parameters
pub const BLINK_SETTINGS: &[ParamField] = &[
    ParamField::color(VarName::Color, 255, 0, 0),
    ParamField::slider(VarName::Speed, 10, 1, 100),
    ParamField::checkbox(VarName::FadeIn, true),
    ParamField::checkbox(VarName::FadeOut, true),
    ParamField::checkbox(VarName::RainbowEnabled, false),
    ParamField::slider(VarName::RainbowSpeed, 30, 1, 100),
];

#[derive(Debug, Clone, Default)]
pub struct BlinkEffect {
    /// Blink cycle position in `[0, 1)`
    timer: f32,
    /// Rainbow cycle position in `[0, 1)`
    rainbow: f32,
}

impl BlinkEffect {
    fn brightness(&self, fade_in: bool, fade_out: bool) -> f32 {
        let t = self.timer;
        let triangle = if t < 0.5 { 2.0 * t } else { 2.0 - 2.0 * t };
        let mut brightness = triangle * triangle * (3.0 - 2.0 * triangle);

        if !fade_in && t < 0.5 {
            brightness = if t > 0.25 { 1.0 } else { 0.0 };
        }
        if !fade_out && t >= 0.5 {
            brightness = if t > 0.75 { 0.0 } else { 1.0 };
        }
        brightness
    }
}

impl<const N: usize> EffectBehavior<N> for BlinkEffect {
    fn animate(&mut self, frame: Frame<'_, N>) {
        let settings = frame.settings;
        let speed = f32::from(settings.slider_or(VarName::Speed, 10));
        advance_cycle(&mut self.timer, frame.delta * speed / 10.0);

        let brightness = self.brightness(
            settings.flag(VarName::FadeIn),
            settings.flag(VarName::FadeOut),
        );

        let color = if settings.flag(VarName::RainbowEnabled) {
            let rainbow_speed = f32::from(settings.slider_or(VarName::RainbowSpeed, 30));
            // speed is in degrees per half second
            advance_cycle(&mut self.rainbow, frame.delta * rainbow_speed * 2.0 / 360.0);
            hsv2rgb(Hsv {
                hue: hue8(self.rainbow),
                sat: 255,
                val: (255.0 * brightness) as u8,
            })
        } else {
            let base = settings.color(VarName::Color).unwrap_or_default();
            scale_color(base, brightness)
        };

        frame.pixels.fill(color);
    }
}
