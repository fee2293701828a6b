//! Connection greeting animation
//!
//! A ring of light grows from the middle of the strip and fades out.

use smart_leds::RGB8;

use super::{ConnectionAnimation, scale_color};

#[derive(Debug, Clone, Copy)]
pub struct ConnectionPulse {
    color: RGB8,
}

impl ConnectionPulse {
    pub const fn new(color: RGB8) -> Self {
        Self { color }
    }
}

impl Default for ConnectionPulse {
    fn default() -> Self {
        Self::new(RGB8 {
            r: 255,
            g: 255,
            b: 255,
        })
    }
}

impl<const N: usize> ConnectionAnimation<N> for ConnectionPulse {
    fn animate(&mut self, pixels: &mut [RGB8; N], _delta: f32, progress: f32) {
        let progress = progress.clamp(0.0, 1.0);
        let center = N as f32 / 2.0;
        let radius = center * progress;
        let color = scale_color(self.color, 1.0 - progress);

        for (i, pixel) in pixels.iter_mut().enumerate() {
            let offset = i as f32 + 0.5 - center;
            let distance = if offset < 0.0 { -offset } else { offset };
            *pixel = if distance <= radius {
                color
            } else {
                RGB8::default()
            };
        }
    }
}
