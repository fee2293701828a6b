//! Frame scheduler - the control loop
//!
//! One tick:
//! - clamps the frame delta
//! - runs the animation state machine and pushes the frame to the strip
//! - polls the transport event channel (throttled for regular effects)
//! - advances the persistence debounce and saves once it elapses
//! - sleeps for the remainder of the frame budget

use embassy_time::{Instant, Timer};
use log::warn;
use smart_leds::RGB8;

use crate::animation::AnimationPhase;
use crate::channel::EventReceiver;
use crate::config::MAX_FRAME_DELTA;
use crate::driver::LedDriver;
use crate::effect::{ConnectionAnimation, EffectBehavior};
use crate::engine::{BootSource, EngineState};
use crate::peripheral::Peripheral;
use crate::persistence::Persistence;
use crate::storage::StorageDriver;

/// Owner of the engine state and all of its collaborators
pub struct FrameScheduler<'a, B, S, D, P, C, const N: usize> {
    state: EngineState<B>,
    persistence: Persistence<S>,
    driver: D,
    peripheral: P,
    connection: C,
    events: EventReceiver<'a>,
    pixels: [RGB8; N],
    /// Seconds until the next transport poll
    poll_timer: f32,
    last_frame: Option<Instant>,
}

impl<'a, B, S, D, P, C, const N: usize> FrameScheduler<'a, B, S, D, P, C, N>
where
    B: EffectBehavior<N>,
    S: StorageDriver,
    D: LedDriver<N>,
    P: Peripheral,
    C: ConnectionAnimation<N>,
{
    pub fn new(
        state: EngineState<B>,
        persistence: Persistence<S>,
        driver: D,
        peripheral: P,
        connection: C,
        events: EventReceiver<'a>,
    ) -> Self {
        Self {
            state,
            persistence,
            driver,
            peripheral,
            connection,
            events,
            pixels: [RGB8::default(); N],
            poll_timer: 0.0,
            last_frame: None,
        }
    }

    /// Load the stored configuration and publish the initial channel values
    pub fn boot(&mut self) -> BootSource {
        self.state.boot(&mut self.persistence, &mut self.peripheral)
    }

    /// Run one frame that lasted `delta` seconds
    pub fn step(&mut self, delta: f32) -> AnimationPhase {
        let delta = delta.clamp(0.0, MAX_FRAME_DELTA);

        let phase = self
            .state
            .animate(&mut self.pixels, &mut self.connection, delta);
        self.driver.write(&self.pixels);

        self.poll_timer -= delta;
        if self.poll_timer <= 0.0 {
            self.poll();
            self.poll_timer = self.state.poll_interval();
        }

        if self.state.dirty.tick(delta) {
            if let Err(err) = self.persistence.save(&mut self.state) {
                warn!("scheduler: failed to save state: {}", err);
            }
        }

        phase
    }

    /// Deliver every pending transport event. Returns the number of events.
    pub fn poll(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events.try_receive() {
            self.state.handle_event(&event, &mut self.peripheral);
            count += 1;
        }
        count
    }

    /// Process one frame and wait for the rest of the frame budget
    pub async fn tick(&mut self) {
        let frame_start = Instant::now();
        let delta = match self.last_frame {
            Some(last) => frame_start.duration_since(last).as_micros() as f32 / 1_000_000.0,
            None => 0.0,
        };
        self.last_frame = Some(frame_start);

        self.step(delta);

        let frame_duration = self.state.config.frame_duration;
        let render_time = frame_start.elapsed();
        if render_time < frame_duration {
            Timer::after(frame_duration - render_time).await;
        }
    }

    /// Run the control loop indefinitely
    pub async fn run(&mut self) -> ! {
        loop {
            self.tick().await;
        }
    }

    pub fn state(&self) -> &EngineState<B> {
        &self.state
    }

    pub fn pixels(&self) -> &[RGB8; N] {
        &self.pixels
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.peripheral
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }
}
