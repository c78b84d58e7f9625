//! Host-facing entry points. The front end holds one [`GreetingCard`] and
//! forwards page events to it; the card fans them out to the audio controller
//! and the particle system, which never share state.

use glam::Vec2;

use crate::autoplay::{AutoplayConfig, AutoplayController, Phase};
use crate::error::CardError;
use crate::host::{Affordance, AudioSink, DrawSurface, PlayTicket, Scheduler, TimerHandle, Viewport};
use crate::particles::ParticleSystem;

pub struct GreetingCard<S: AudioSink, H: Affordance> {
    audio: AutoplayController<S, H>,
    particles: ParticleSystem,
}

impl<S: AudioSink, H: Affordance> GreetingCard<S, H> {
    pub fn new(sink: S, hint: H, config: AutoplayConfig, particles: ParticleSystem) -> Self {
        Self {
            audio: AutoplayController::new(sink, hint, config),
            particles,
        }
    }

    /// Size the surfaces for the current viewport. Fails when a layer points
    /// at a surface the host did not provide.
    pub fn attach(
        &mut self,
        viewport: Viewport,
        surfaces: &mut [&mut dyn DrawSurface],
    ) -> Result<(), CardError> {
        self.particles.validate(surfaces.len())?;
        self.particles.resize(viewport, surfaces);
        Ok(())
    }

    pub fn on_load(&mut self, now_ms: f64, timers: &mut dyn Scheduler) {
        self.audio.init(now_ms, timers);
    }

    pub fn on_first_gesture(&mut self, now_ms: f64, timers: &mut dyn Scheduler) -> bool {
        self.audio.on_first_gesture(now_ms, timers)
    }

    pub fn on_affordance_tap(&mut self, now_ms: f64, timers: &mut dyn Scheduler) -> bool {
        self.audio.on_affordance_gesture(now_ms, timers)
    }

    pub fn on_visibility_change(
        &mut self,
        visible: bool,
        now_ms: f64,
        timers: &mut dyn Scheduler,
    ) -> bool {
        self.audio.on_visibility_change(visible, now_ms, timers)
    }

    pub fn on_resize(&mut self, viewport: Viewport, surfaces: &mut [&mut dyn DrawSurface]) {
        self.particles.resize(viewport, surfaces);
    }

    pub fn on_timer(&mut self, handle: TimerHandle, now_ms: f64, timers: &mut dyn Scheduler) {
        self.audio.on_timer(handle, now_ms, timers);
    }

    pub fn on_play_settled(
        &mut self,
        ticket: PlayTicket,
        granted: bool,
        now_ms: f64,
        timers: &mut dyn Scheduler,
    ) {
        self.audio.on_play_settled(ticket, granted, now_ms, timers);
    }

    pub fn frame(&mut self, dt_ms: f32, surfaces: &mut [&mut dyn DrawSurface]) {
        self.particles.frame(dt_ms, surfaces);
    }

    pub fn burst_confetti(&mut self, origin: Option<Vec2>) -> usize {
        self.particles.burst_confetti(origin)
    }

    pub fn intensify_sparks(&mut self, duration_ms: f64) -> usize {
        self.particles.intensify_sparks(duration_ms)
    }

    /// The "surprise" reveal: confetti at `origin` plus a fresh fade-in. If
    /// sound is still locked the click doubles as an unmute gesture.
    pub fn surprise(
        &mut self,
        origin: Option<Vec2>,
        now_ms: f64,
        timers: &mut dyn Scheduler,
    ) -> usize {
        let added = self.particles.burst_confetti(origin);
        if self.audio.phase() == Phase::Unlocked {
            self.audio.fade_in(timers);
        } else {
            self.audio.on_affordance_gesture(now_ms, timers);
        }
        added
    }

    pub fn toggle_playback(&mut self, now_ms: f64, timers: &mut dyn Scheduler) -> bool {
        self.audio.toggle_playback(now_ms, timers)
    }

    pub fn teardown(&mut self, timers: &mut dyn Scheduler) {
        self.audio.teardown(timers);
    }

    pub fn audio(&self) -> &AutoplayController<S, H> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AutoplayController<S, H> {
        &mut self.audio
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }
}
