use glam::Vec2;
use rand::Rng;

use super::particle::{Particle, StepResult};
use crate::constants::MIN_VIEWPORT_DIM;
use crate::host::{DrawSurface, Viewport};

/// Particle count as a function of viewport width: one particle per
/// `px_per_particle` CSS pixels, never fewer than `floor`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensityRule {
    pub floor: usize,
    pub px_per_particle: f32,
}

impl DensityRule {
    pub const fn new(floor: usize, px_per_particle: f32) -> Self {
        Self {
            floor,
            px_per_particle,
        }
    }

    pub fn count(&self, width: f32) -> usize {
        let width = if width.is_finite() {
            width.max(MIN_VIEWPORT_DIM)
        } else {
            MIN_VIEWPORT_DIM
        };
        let per = self.px_per_particle.max(MIN_VIEWPORT_DIM);
        ((width / per).round() as usize).max(self.floor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayerKind {
    /// Parallax petals; `depth` 0 is far, 1 is near.
    Petal { depth: f32 },
    Spark,
    Heart,
    /// Burst-only layer, empty until `burst` is called.
    Confetti,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerSpec {
    pub name: String,
    pub kind: LayerKind,
    /// Index into the surfaces handed to `ParticleSystem::frame`.
    pub surface: usize,
    pub density: Option<DensityRule>,
}

impl LayerSpec {
    pub fn new(
        name: impl Into<String>,
        kind: LayerKind,
        surface: usize,
        density: Option<DensityRule>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            surface,
            density,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Boost {
    extra: usize,
    until_ms: f64,
}

/// A named group of particles drawn onto one surface. The layer owns its
/// particles outright; order within `particles` is draw order.
#[derive(Clone, Debug)]
pub struct ParticleLayer {
    spec: LayerSpec,
    particles: Vec<Particle>,
    baseline: usize,
    boost: Option<Boost>,
}

impl ParticleLayer {
    pub fn new(spec: LayerSpec) -> Self {
        Self {
            spec,
            particles: Vec::new(),
            baseline: 0,
            boost: None,
        }
    }

    pub fn spec(&self) -> &LayerSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn kind(&self) -> LayerKind {
        self.spec.kind
    }

    pub fn surface(&self) -> usize {
        self.spec.surface
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Count the density rule asks for at the current viewport.
    pub fn baseline(&self) -> usize {
        self.baseline
    }

    pub fn is_boosted(&self) -> bool {
        self.boost.is_some()
    }

    fn spawn<R: Rng>(&self, vp: &Viewport, rng: &mut R, initial: bool) -> Option<Particle> {
        Some(match self.spec.kind {
            LayerKind::Petal { depth } => Particle::petal(depth, vp, rng, initial),
            LayerKind::Spark => Particle::spark(vp, rng, initial),
            LayerKind::Heart => Particle::heart(vp, rng, initial),
            LayerKind::Confetti => return None,
        })
    }

    fn fill_to<R: Rng>(&mut self, target: usize, vp: &Viewport, rng: &mut R) {
        self.particles.truncate(target);
        while self.particles.len() < target {
            match self.spawn(vp, rng, true) {
                Some(p) => self.particles.push(p),
                None => break,
            }
        }
    }

    /// Recount against a new viewport. Surviving particles keep their state;
    /// any now outside the recycling band respawn on their next step.
    pub fn recount<R: Rng>(&mut self, vp: &Viewport, rng: &mut R) {
        let Some(rule) = self.spec.density else {
            return;
        };
        self.baseline = rule.count(vp.width);
        let extra = self.boost.map_or(0, |b| b.extra);
        self.fill_to(self.baseline + extra, vp, rng);
        log::debug!(
            "[particles] layer `{}` -> {} (+{})",
            self.spec.name,
            self.baseline,
            extra
        );
    }

    /// Add `extra` particles until `until_ms` on the system clock. A boost
    /// already running is extended rather than stacked.
    pub fn boost<R: Rng>(&mut self, extra: usize, until_ms: f64, vp: &Viewport, rng: &mut R) {
        match &mut self.boost {
            Some(b) => b.until_ms = b.until_ms.max(until_ms),
            None => {
                self.boost = Some(Boost { extra, until_ms });
                self.fill_to(self.baseline + extra, vp, rng);
            }
        }
    }

    /// Drop an expired boost back to the baseline count.
    pub fn expire_boost(&mut self, clock_ms: f64) {
        if let Some(b) = self.boost {
            if clock_ms >= b.until_ms {
                self.boost = None;
                self.particles.truncate(self.baseline);
            }
        }
    }

    /// Append a burst of confetti. No-op on non-confetti layers.
    pub fn burst<R: Rng>(&mut self, origin: Vec2, count: usize, rng: &mut R) -> usize {
        if self.spec.kind != LayerKind::Confetti {
            return 0;
        }
        self.particles
            .extend((0..count).map(|_| Particle::confetti(origin, rng)));
        count
    }

    /// Step every particle, then draw it, in insertion order. Expired
    /// particles are removed without disturbing the order of the rest.
    pub fn advance<R: Rng>(
        &mut self,
        dt_ms: f32,
        wall_ms: f32,
        vp: &Viewport,
        rng: &mut R,
        mut surface: Option<&mut (dyn DrawSurface + '_)>,
    ) {
        self.particles.retain_mut(|p| {
            if p.step(dt_ms, wall_ms, vp, rng) == StepResult::Expired {
                return false;
            }
            if let Some(s) = surface.as_deref_mut() {
                p.render(s);
            }
            true
        });
    }
}
