// Path outlines for each particle variant, drawn around the local origin.

use std::f32::consts::TAU;

use super::particle::{Motion, Particle, HEART_COLOR, PETAL_COLOR, SPARK_COLOR};
use crate::constants::{PETAL_BASE_PX, PETAL_PATH_EXTENT};
use crate::host::DrawSurface;

impl Particle {
    pub fn render(&self, surface: &mut dyn DrawSurface) {
        if self.opacity <= 0.0 {
            return;
        }
        surface.save();
        surface.set_alpha(self.opacity.min(1.0));
        match &self.motion {
            Motion::Petal { .. } => {
                surface.translate(self.pos.x, self.pos.y);
                surface.rotate(self.rotation);
                let k = self.size * PETAL_BASE_PX / PETAL_PATH_EXTENT;
                surface.scale(k, k);
                surface.set_fill(PETAL_COLOR);
                petal_path(surface);
                surface.fill();
            }
            Motion::Spark { .. } => {
                surface.set_fill(SPARK_COLOR);
                surface.begin_path();
                surface.arc(self.pos.x, self.pos.y, self.size, 0.0, TAU);
                surface.fill();
            }
            Motion::Heart { .. } => {
                surface.translate(self.pos.x, self.pos.y);
                surface.rotate(self.rotation);
                surface.scale(self.size, self.size);
                surface.set_fill(HEART_COLOR);
                heart_path(surface);
                surface.fill();
            }
            Motion::Confetti { aspect, color, .. } => {
                surface.translate(self.pos.x, self.pos.y);
                surface.rotate(self.rotation);
                surface.set_fill(*color);
                let w = self.size;
                let h = self.size * aspect;
                surface.fill_rect(-w * 0.5, -h * 0.5, w, h);
            }
        }
        surface.restore();
    }
}

// Teardrop petal, roughly 108 x 128 path units, tip pointing down.
fn petal_path(s: &mut dyn DrawSurface) {
    s.begin_path();
    s.move_to(0.0, -26.0);
    s.bezier_curve_to(18.0, -54.0, 46.0, -54.0, 54.0, -26.0);
    s.bezier_curve_to(46.0, 8.0, 18.0, 36.0, 0.0, 74.0);
    s.bezier_curve_to(-18.0, 36.0, -46.0, 8.0, -54.0, -26.0);
    s.close_path();
}

// Unit heart: lobes at y = -0.25, point at y = 0.6.
fn heart_path(s: &mut dyn DrawSurface) {
    s.begin_path();
    s.move_to(0.0, -0.25);
    s.bezier_curve_to(-0.5, -0.75, -1.0, -0.1, 0.0, 0.6);
    s.bezier_curve_to(1.0, -0.1, 0.5, -0.75, 0.0, -0.25);
    s.close_path();
}
