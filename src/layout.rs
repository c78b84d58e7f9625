// Pure viewport helpers shared by the resize and pixel-density listeners.

use std::cell::Cell;
use std::rc::Rc;

use card_core::Viewport;

/// Viewport from the window's inner size and device pixel ratio. Browsers
/// report zero sizes for hidden iframes; those are clamped rather than
/// rejected.
pub fn viewport_from_window(inner_width: f64, inner_height: f64, dpr: f64) -> Viewport {
    Viewport::new(inner_width as f32, inner_height as f32, dpr as f32).clamped()
}

/// Media query that stops matching once the device pixel ratio moves away
/// from `dpr`, e.g. when the window is dragged to another monitor.
pub fn resolution_query(dpr: f64) -> String {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    format!("(resolution: {}dppx)", dpr)
}

/// Seed for the particle RNG derived from a millisecond clock reading.
pub fn seed_from_clock(now_ms: f64, fallback: u64) -> u64 {
    if now_ms.is_finite() && now_ms > 0.0 {
        (now_ms * 1_000.0) as u64 ^ fallback
    } else {
        fallback
    }
}

/// A resize that arrived while the runtime was busy. Clones share one flag;
/// the frame loop takes it and applies the resize before drawing.
#[derive(Clone, Debug, Default)]
pub struct PendingResize(Rc<Cell<bool>>);

impl PendingResize {
    pub fn mark(&self) {
        self.0.set(true);
    }

    pub fn is_marked(&self) -> bool {
        self.0.get()
    }

    /// Clears the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}
