//! LED output abstraction
//!
//! The frame scheduler hands every rendered frame to a [`LedDriver`], keeping
//! the engine independent of the strip hardware.

use smart_leds::RGB8;

/// LED strip driver
pub trait LedDriver<const N: usize> {
    /// Push one frame to the strip
    fn write(&mut self, pixels: &[RGB8; N]);
}
