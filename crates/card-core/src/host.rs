//! Capabilities the core needs from its environment.
//!
//! The browser front end implements these on top of `web-sys`; tests implement
//! them with scripted fakes. Nothing here may panic or unwind across the
//! boundary: failures are reported as values.

use crate::constants::{MIN_PIXEL_RATIO, MIN_VIEWPORT_DIM};

/// Opaque identifier for a timer created by a [`Scheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Identifies one playback request so late results can be matched to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayTicket(pub u64);

/// Result of asking the host to start playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    Granted,
    /// The platform refused (autoplay policy). Expected, never fatal.
    Blocked,
    /// The result arrives later through `on_play_settled` with the same ticket.
    Pending,
}

pub trait AudioSink {
    fn play(&mut self, ticket: PlayTicket) -> PlayOutcome;
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
    fn set_volume(&mut self, volume: f32);
}

/// The "tap to enable sound" hint.
pub trait Affordance {
    fn show(&mut self);
    fn hide(&mut self);
}

pub trait Scheduler {
    fn schedule_once(&mut self, delay_ms: f64) -> TimerHandle;
    fn schedule_repeating(&mut self, interval_ms: f64) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Straight RGB colour; alpha is applied separately through `set_alpha`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// 2D drawing target. Coordinates are CSS pixels; the surface applies the
/// device pixel ratio itself after `resize`.
pub trait DrawSurface {
    fn resize(&mut self, viewport: Viewport);
    fn clear(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    fn set_alpha(&mut self, alpha: f32);
    fn set_fill(&mut self, color: Color);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn bezier_curve_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32);
    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, end: f32);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
}

/// Visible area in CSS pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// Same viewport with every dimension raised to a usable minimum.
    /// Zero, negative and NaN sizes all collapse to the floor.
    pub fn clamped(self) -> Self {
        let floor = |v: f32, min: f32| if v.is_finite() && v > min { v } else { min };
        Self {
            width: floor(self.width, MIN_VIEWPORT_DIM),
            height: floor(self.height, MIN_VIEWPORT_DIM),
            pixel_ratio: floor(self.pixel_ratio, MIN_PIXEL_RATIO),
        }
    }

    /// Backing-store size in device pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let v = self.clamped();
        (
            ((v.width * v.pixel_ratio).floor() as u32).max(1),
            ((v.height * v.pixel_ratio).floor() as u32).max(1),
        )
    }

    pub fn center(&self) -> glam::Vec2 {
        let v = self.clamped();
        glam::Vec2::new(v.width * 0.5, v.height * 0.5)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(MIN_VIEWPORT_DIM, MIN_VIEWPORT_DIM, MIN_PIXEL_RATIO)
    }
}
