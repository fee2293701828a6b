//! Per-frame animation state machine
//!
//! Exactly one animation runs per frame: the connection transition, the
//! selected effect or, for a visualizer without audio, its fallback effect.

use smart_leds::RGB8;

use crate::effect::{ConnectionAnimation, EffectBehavior, Frame};
use crate::engine::EngineState;

/// What the last frame rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    /// Nothing was animated
    Idle,
    /// The "peer connected" animation
    ConnectionTransition,
    /// A visualizer with audio signal
    VisualizerActive,
    /// The fallback effect of a visualizer without audio signal
    VisualizerFallback,
    /// A regular effect
    PlainEffect,
}

impl<B> EngineState<B> {
    /// Render one frame into `pixels`
    pub fn animate<C, const N: usize>(
        &mut self,
        pixels: &mut [RGB8; N],
        connection: &mut C,
        delta: f32,
    ) -> AnimationPhase
    where
        B: EffectBehavior<N>,
        C: ConnectionAnimation<N>,
    {
        let phase = self.render(pixels, connection, delta);
        self.phase = phase;
        phase
    }

    fn render<C, const N: usize>(
        &mut self,
        pixels: &mut [RGB8; N],
        connection: &mut C,
        delta: f32,
    ) -> AnimationPhase
    where
        B: EffectBehavior<N>,
        C: ConnectionAnimation<N>,
    {
        if self.connection_timer > 0.0 {
            let duration = self.config.connection_transition;
            let progress = if duration > 0.0 {
                ((duration - self.connection_timer) / duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            connection.animate(pixels, delta, progress);
            self.connection_timer = (self.connection_timer - delta).max(0.0);
            return AnimationPhase::ConnectionTransition;
        }

        let selected = usize::from(self.device.selected_effect);
        let Some(effect) = self.registry.get(selected) else {
            return AnimationPhase::Idle;
        };

        let (index, phase) = if effect.is_visualizer() {
            if self.audio.decay(delta) > 0.0 {
                (selected, AnimationPhase::VisualizerActive)
            } else {
                (
                    usize::from(self.device.selected_effect_secondary),
                    AnimationPhase::VisualizerFallback,
                )
            }
        } else {
            (selected, AnimationPhase::PlainEffect)
        };

        let Some(effect) = self.registry.get_mut(index) else {
            return AnimationPhase::Idle;
        };
        let (behavior, settings) = effect.parts_mut();
        behavior.animate(Frame {
            pixels,
            settings,
            audio: &self.audio,
            delta,
        });
        phase
    }
}
