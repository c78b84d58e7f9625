//! Particle layers stepped and drawn once per host frame.
//!
//! A [`ParticleSystem`] owns every layer and the RNG they draw spawn states
//! from. Each frame clears the surfaces, then steps and renders each particle
//! in layer order and insertion order, so the picture always reflects
//! post-step state. Only two operations grow a layer beyond its density rule,
//! `burst_confetti` and `intensify_sparks`, and both revert on their own.

mod layer;
mod particle;
mod shapes;

pub use layer::*;
pub use particle::*;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

use crate::constants::*;
use crate::error::CardError;
use crate::host::{DrawSurface, Viewport};

pub const PETAL_SURFACE: usize = 0;
pub const SPARKLE_SURFACE: usize = 1;

#[derive(Clone, Debug, PartialEq)]
pub struct BurstConfig {
    pub min_count: usize,
    pub max_count: usize,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            min_count: CONFETTI_MIN,
            max_count: CONFETTI_MAX,
        }
    }
}

/// Layers the card ships with: three petal depths, rising hearts, twinkling
/// sparks and a burst-only confetti layer.
pub fn default_layers() -> Vec<LayerSpec> {
    vec![
        LayerSpec::new(
            "petals-far",
            LayerKind::Petal { depth: 0.28 },
            PETAL_SURFACE,
            Some(DensityRule::new(12, 60.0)),
        ),
        LayerSpec::new(
            "petals-mid",
            LayerKind::Petal { depth: 0.6 },
            PETAL_SURFACE,
            Some(DensityRule::new(18, 40.0)),
        ),
        LayerSpec::new(
            "petals-near",
            LayerKind::Petal { depth: 0.95 },
            PETAL_SURFACE,
            Some(DensityRule::new(28, 28.0)),
        ),
        LayerSpec::new(
            "hearts",
            LayerKind::Heart,
            PETAL_SURFACE,
            Some(DensityRule::new(8, 120.0)),
        ),
        LayerSpec::new(
            "sparks",
            LayerKind::Spark,
            SPARKLE_SURFACE,
            Some(DensityRule::new(10, 90.0)),
        ),
        LayerSpec::new("confetti", LayerKind::Confetti, SPARKLE_SURFACE, None),
    ]
}

pub struct ParticleSystem {
    layers: SmallVec<[ParticleLayer; 6]>,
    viewport: Viewport,
    rng: StdRng,
    burst: BurstConfig,
    clock_ms: f64,
}

impl ParticleSystem {
    pub fn new(specs: Vec<LayerSpec>, viewport: Viewport, seed: u64) -> Self {
        let viewport = viewport.clamped();
        let mut rng = StdRng::seed_from_u64(seed);
        let layers = specs
            .into_iter()
            .map(|spec| {
                let mut layer = ParticleLayer::new(spec);
                layer.recount(&viewport, &mut rng);
                layer
            })
            .collect();
        Self {
            layers,
            viewport,
            rng,
            burst: BurstConfig::default(),
            clock_ms: 0.0,
        }
    }

    pub fn with_default_layers(viewport: Viewport, seed: u64) -> Self {
        Self::new(default_layers(), viewport, seed)
    }

    pub fn with_burst_config(mut self, burst: BurstConfig) -> Self {
        self.burst = burst;
        self
    }

    /// Number of surfaces the layers expect.
    pub fn surface_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.surface() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Check every layer has a surface to draw on.
    pub fn validate(&self, available: usize) -> Result<(), CardError> {
        for layer in &self.layers {
            if layer.surface() >= available {
                return Err(CardError::MissingSurface {
                    layer: layer.name().to_string(),
                    index: layer.surface(),
                    available,
                });
            }
        }
        Ok(())
    }

    /// Resize surfaces and recount every layer. Degenerate viewports are
    /// clamped, never rejected.
    pub fn resize(&mut self, viewport: Viewport, surfaces: &mut [&mut dyn DrawSurface]) {
        self.viewport = viewport.clamped();
        for s in surfaces.iter_mut() {
            s.resize(self.viewport);
        }
        for layer in self.layers.iter_mut() {
            layer.recount(&self.viewport, &mut self.rng);
        }
        log::debug!(
            "[particles] resized to {}x{} @{}x, {} particles",
            self.viewport.width,
            self.viewport.height,
            self.viewport.pixel_ratio,
            self.total_len()
        );
    }

    /// One rendered frame: clear, then step-and-draw every particle.
    pub fn frame(&mut self, dt_ms: f32, surfaces: &mut [&mut dyn DrawSurface]) {
        for s in surfaces.iter_mut() {
            s.clear();
        }
        self.advance(dt_ms, surfaces);
    }

    /// Step without drawing.
    pub fn step(&mut self, dt_ms: f32) {
        self.advance(dt_ms, &mut []);
    }

    fn advance(&mut self, dt_ms: f32, surfaces: &mut [&mut dyn DrawSurface]) {
        let wall = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        let motion = wall.min(MAX_FRAME_DT_MS);
        self.clock_ms += wall as f64;
        for layer in self.layers.iter_mut() {
            layer.expire_boost(self.clock_ms);
            let surface = surfaces.get_mut(layer.surface()).map(|s| &mut **s);
            layer.advance(motion, wall, &self.viewport, &mut self.rng, surface);
        }
    }

    /// Spawn a confetti burst at `origin`, or the viewport centre. Returns how
    /// many pieces were added.
    pub fn burst_confetti(&mut self, origin: Option<Vec2>) -> usize {
        let origin = origin.unwrap_or_else(|| self.viewport.center());
        let (lo, hi) = (
            self.burst.min_count.min(self.burst.max_count),
            self.burst.max_count.max(self.burst.min_count),
        );
        let count = self.rng.gen_range(lo..=hi);
        let Some(layer) = self
            .layers
            .iter_mut()
            .find(|l| l.kind() == LayerKind::Confetti)
        else {
            log::warn!("[particles] burst requested but no confetti layer");
            return 0;
        };
        layer.burst(origin, count, &mut self.rng)
    }

    /// Add `SPARK_BOOST_COUNT` sparks for `duration_ms`, then drop back to
    /// the density baseline.
    pub fn intensify_sparks(&mut self, duration_ms: f64) -> usize {
        let until = self.clock_ms + duration_ms.max(0.0);
        let mut added = 0;
        for layer in self
            .layers
            .iter_mut()
            .filter(|l| l.kind() == LayerKind::Spark)
        {
            let before = layer.len();
            layer.boost(SPARK_BOOST_COUNT, until, &self.viewport, &mut self.rng);
            added += layer.len() - before;
        }
        added
    }

    pub fn layers(&self) -> &[ParticleLayer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&ParticleLayer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn count_where(&self, pred: impl Fn(LayerKind) -> bool) -> usize {
        self.layers
            .iter()
            .filter(|l| pred(l.kind()))
            .map(|l| l.len())
            .sum()
    }

    pub fn confetti_count(&self) -> usize {
        self.count_where(|k| k == LayerKind::Confetti)
    }

    pub fn spark_count(&self) -> usize {
        self.count_where(|k| k == LayerKind::Spark)
    }

    pub fn total_len(&self) -> usize {
        self.layers.iter().map(|l| l.len()).sum()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Milliseconds of wall time stepped so far.
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }
}
