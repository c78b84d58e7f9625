use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::constants::*;
use crate::host::{Color, Viewport};

pub const PETAL_COLOR: Color = Color::rgb(255, 179, 207);
pub const SPARK_COLOR: Color = Color::rgb(255, 200, 230);
pub const HEART_COLOR: Color = Color::rgb(255, 92, 141);
pub const CONFETTI_PALETTE: [Color; 6] = [
    Color::rgb(255, 107, 157),
    Color::rgb(255, 209, 102),
    Color::rgb(6, 214, 160),
    Color::rgb(17, 138, 178),
    Color::rgb(239, 71, 111),
    Color::rgb(255, 255, 255),
];

/// Variant-specific motion state. Petal and Spark oscillate and recycle,
/// Heart and Confetti move ballistically; only Confetti expires.
#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    Petal {
        depth: f32,
        drift: Vec2,
        spin: f32,
        swing: f32,
    },
    Spark {
        twinkle: f32,
        fall: f32,
    },
    Heart {
        velocity: Vec2,
        spin: f32,
    },
    Confetti {
        velocity: Vec2,
        spin: f32,
        aspect: f32,
        color: Color,
        life: f32,
        ttl: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Alive,
    Expired,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub rotation: f32,
    pub size: f32,
    pub opacity: f32,
    pub phase: f32,
    pub motion: Motion,
}

/// Uniform sample that tolerates an empty or inverted range.
#[inline]
pub(crate) fn span<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

#[inline]
pub fn depth_size(depth: f32) -> f32 {
    DEPTH_SIZE_BASE + depth.clamp(0.0, 1.0) * DEPTH_SIZE_SPAN
}

#[inline]
pub fn depth_speed(depth: f32) -> f32 {
    DEPTH_SPEED_BASE + depth.clamp(0.0, 1.0) * DEPTH_SPEED_SPAN
}

#[inline]
pub fn depth_alpha(depth: f32) -> f32 {
    DEPTH_ALPHA_BASE + depth.clamp(0.0, 1.0) * DEPTH_ALPHA_SPAN
}

/// True once a position has left the recycling band around the viewport.
#[inline]
pub fn out_of_bounds(pos: Vec2, vp: &Viewport) -> bool {
    pos.x < -RECYCLE_MARGIN
        || pos.x > vp.width + RECYCLE_MARGIN
        || pos.y < -RECYCLE_MARGIN
        || pos.y > vp.height + RECYCLE_MARGIN_BOTTOM
}

impl Particle {
    /// `initial` scatters petals over the whole viewport instead of the
    /// respawn band above it, so the first frame is not empty.
    pub fn petal<R: Rng>(depth: f32, vp: &Viewport, rng: &mut R, initial: bool) -> Self {
        let depth = depth.clamp(0.0, 1.0);
        let y = if initial {
            span(rng, PETAL_SPAWN_Y_MIN, vp.height)
        } else {
            span(rng, PETAL_SPAWN_Y_MIN, PETAL_SPAWN_Y_MAX)
        };
        Self {
            pos: Vec2::new(
                span(
                    rng,
                    -PETAL_SPAWN_X_OVERSCAN,
                    vp.width + PETAL_SPAWN_X_OVERSCAN,
                ),
                y,
            ),
            rotation: span(rng, 0.0, TAU),
            size: span(rng, 0.5, 1.6) * depth_size(depth),
            opacity: span(rng, 0.55, 1.0) * depth_alpha(depth),
            phase: span(rng, 0.0, TAU),
            motion: Motion::Petal {
                depth,
                drift: Vec2::new(
                    span(rng, -0.6, 0.6) * (0.6 + depth * 0.6),
                    span(rng, 0.35, 1.6) * depth_speed(depth),
                ),
                spin: span(rng, -0.02, 0.02) * (1.0 + depth),
                swing: span(rng, 12.0, 80.0),
            },
        }
    }

    pub fn spark<R: Rng>(vp: &Viewport, rng: &mut R, initial: bool) -> Self {
        let y = if initial {
            span(rng, 0.0, vp.height)
        } else {
            span(rng, -40.0, 0.0)
        };
        let phase = span(rng, 0.0, TAU);
        Self {
            pos: Vec2::new(span(rng, 0.0, vp.width), y),
            rotation: 0.0,
            size: span(rng, 1.0, 5.0),
            opacity: SPARK_ALPHA_BASE + phase.sin() * SPARK_ALPHA_SWING,
            phase,
            motion: Motion::Spark {
                twinkle: span(rng, 0.02, 0.2),
                fall: SPARK_FALL_SPEED * span(rng, 0.5, 1.5),
            },
        }
    }

    pub fn heart<R: Rng>(vp: &Viewport, rng: &mut R, initial: bool) -> Self {
        let y = if initial {
            span(rng, 0.0, vp.height)
        } else {
            vp.height + span(rng, HEART_SPAWN_BELOW_MIN, HEART_SPAWN_BELOW_MAX)
        };
        Self {
            pos: Vec2::new(span(rng, 0.0, vp.width), y),
            rotation: span(rng, -0.3, 0.3),
            size: span(rng, 8.0, 18.0),
            opacity: span(rng, 0.5, 0.9),
            phase: span(rng, 0.0, TAU),
            motion: Motion::Heart {
                velocity: Vec2::new(
                    span(rng, -0.3, 0.3),
                    -span(rng, HEART_RISE_MIN, HEART_RISE_MAX),
                ),
                spin: span(rng, -0.01, 0.01),
            },
        }
    }

    pub fn confetti<R: Rng>(origin: Vec2, rng: &mut R) -> Self {
        let angle = span(rng, 0.0, TAU);
        let speed = span(rng, CONFETTI_SPEED_MIN, CONFETTI_SPEED_MAX);
        let color = CONFETTI_PALETTE[rng.gen_range(0..CONFETTI_PALETTE.len())];
        Self {
            pos: origin,
            rotation: span(rng, 0.0, TAU),
            size: span(rng, 6.0, 10.0),
            opacity: 1.0,
            phase: 0.0,
            motion: Motion::Confetti {
                velocity: Vec2::new(angle.cos() * speed, angle.sin() * speed - CONFETTI_LIFT),
                spin: span(rng, -0.2, 0.2),
                aspect: span(rng, 0.4, 0.7),
                color,
                life: 0.0,
                ttl: span(rng, CONFETTI_TTL_MIN_MS, CONFETTI_TTL_MAX_MS),
            },
        }
    }

    /// Fresh spawn of the same variant. Petals keep their depth.
    fn respawn<R: Rng>(&mut self, vp: &Viewport, rng: &mut R) {
        *self = match self.motion {
            Motion::Petal { depth, .. } => Particle::petal(depth, vp, rng, false),
            Motion::Spark { .. } => Particle::spark(vp, rng, false),
            Motion::Heart { .. } => Particle::heart(vp, rng, false),
            Motion::Confetti { .. } => return,
        };
    }

    /// Advance by `dt_ms` of motion time and `wall_ms` of lifetime. Returns
    /// `Expired` only for confetti; other variants recycle in place.
    pub fn step<R: Rng>(
        &mut self,
        dt_ms: f32,
        wall_ms: f32,
        vp: &Viewport,
        rng: &mut R,
    ) -> StepResult {
        let frames = dt_ms / REFERENCE_FRAME_MS;
        match &mut self.motion {
            Motion::Petal {
                depth,
                drift,
                spin,
                swing,
            } => {
                self.phase += dt_ms * PETAL_PHASE_RATE * (0.7 + *depth * 0.6);
                let sway = self.phase.sin() * (*swing / 40.0) * PETAL_SWAY_GAIN * (1.0 + *depth * 0.4);
                self.pos.x += (sway + drift.x) * frames;
                self.pos.y += drift.y * frames;
                self.rotation += *spin * frames;
            }
            Motion::Spark { twinkle, fall } => {
                self.phase += dt_ms * SPARK_PHASE_RATE * *twinkle;
                self.opacity = SPARK_ALPHA_BASE + self.phase.sin() * SPARK_ALPHA_SWING;
                self.pos.x += self.phase.cos() * 0.15 * frames;
                self.pos.y += *fall * frames;
            }
            Motion::Heart { velocity, spin } => {
                self.phase += dt_ms * 0.0015;
                self.pos += (*velocity + Vec2::new(self.phase.sin() * 0.4, 0.0)) * frames;
                self.rotation += *spin * frames;
            }
            Motion::Confetti {
                velocity,
                spin,
                life,
                ttl,
                ..
            } => {
                velocity.y += CONFETTI_GRAVITY * frames;
                self.pos += *velocity * frames;
                self.rotation += *spin * frames;
                *life += wall_ms;
                self.opacity = (1.0 - *life / *ttl).clamp(0.0, 1.0);
                if *life >= *ttl || out_of_bounds(self.pos, vp) {
                    return StepResult::Expired;
                }
                return StepResult::Alive;
            }
        }
        if out_of_bounds(self.pos, vp) {
            self.respawn(vp, rng);
        }
        StepResult::Alive
    }

    pub fn kind_name(&self) -> &'static str {
        match self.motion {
            Motion::Petal { .. } => "petal",
            Motion::Spark { .. } => "spark",
            Motion::Heart { .. } => "heart",
            Motion::Confetti { .. } => "confetti",
        }
    }
}
