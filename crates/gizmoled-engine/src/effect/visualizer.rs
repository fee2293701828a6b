//! VU visualizer effect
//!
//! Band 0 lights the whole strip in the base color. The remaining bands are
//! spread as floating points around the strip, blended linearly between
//! neighbours, and slowly rotate.

use smart_leds::RGB8;

use super::{EffectBehavior, Frame, advance_cycle, fract};
use crate::config::NUM_AUDIO_BANDS;
use crate::schema::{ParamField, VarName};

/// Compiled-in visualizer parameters
pub const VISUALIZER_SETTINGS: &[ParamField] = &[
    ParamField::color(VarName::ColorBackground, 0, 0, 255),
    ParamField::color(VarName::Color, 255, 0, 128),
    ParamField::slider(VarName::Brightness, 255, 0, 255),
    ParamField::slider(VarName::Speed, 2, 0, 100),
];

const FLOATING_POINTS: usize = NUM_AUDIO_BANDS - 1;

#[derive(Debug, Clone, Default)]
pub struct VisualizerEffect {
    /// Rotation of the floating points in `[0, 1)`
    position: f32,
}

fn channel(base: u8, base_amount: f32, point: u8, point_amount: f32) -> u8 {
    let value = f32::from(base) * base_amount + f32::from(point) * point_amount;
    value.min(255.0) as u8
}

impl<const N: usize> EffectBehavior<N> for VisualizerEffect {
    fn animate(&mut self, frame: Frame<'_, N>) {
        let settings = frame.settings;
        let base_color = settings.color(VarName::ColorBackground).unwrap_or_default();
        let point_color = settings.color(VarName::Color).unwrap_or_default();
        let brightness = f32::from(settings.slider_or(VarName::Brightness, 255)) / 255.0;
        let speed = f32::from(settings.slider_or(VarName::Speed, 2));

        advance_cycle(&mut self.position, speed / 10.0 * frame.delta);

        let base_amount = brightness * frame.audio.level(0);
        for (i, pixel) in frame.pixels.iter_mut().enumerate() {
            let led_position = fract(i as f32 / N as f32 + self.position);
            let scaled = led_position * FLOATING_POINTS as f32;
            let point1 = (scaled as usize).min(FLOATING_POINTS - 1);
            let point2 = (point1 + 1) % FLOATING_POINTS;
            let amount1 = 1.0 - fract(scaled);
            let amount2 = 1.0 - amount1;

            let point_amount = brightness
                * (frame.audio.level(point1 + 1) * amount1
                    + frame.audio.level(point2 + 1) * amount2);

            *pixel = RGB8 {
                r: channel(base_color.r, base_amount, point_color.r, point_amount),
                g: channel(base_color.g, base_amount, point_color.g, point_amount),
                b: channel(base_color.b, base_amount, point_color.b, point_amount),
            };
        }
    }
}
