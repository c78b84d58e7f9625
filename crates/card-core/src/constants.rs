// Shared tuning constants for the autoplay controller and the particle layers.
// Motion rates are per 60 Hz frame; the engine rescales them by the real dt.

// Viewport floors
pub const MIN_VIEWPORT_DIM: f32 = 1.0;
pub const MIN_PIXEL_RATIO: f32 = 1.0;

// Autoplay unlock timing (milliseconds)
pub const SETTLE_DELAY_MS: f64 = 500.0; // muted play -> first unmute attempt
pub const RETRY_INTERVAL_MS: f64 = 700.0;
pub const RETRY_WINDOW_MS: f64 = 18_000.0; // measured from the first retry-loop entry

// Fade-in
pub const FADE_STEP: f32 = 0.02;
pub const FADE_INTERVAL_MS: f64 = 80.0;
pub const TARGET_VOLUME: f32 = 0.85;

// Frame timing
pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;
pub const MAX_FRAME_DT_MS: f32 = 100.0; // clamp after a backgrounded tab

// Recycling bounds around the viewport (CSS px)
pub const RECYCLE_MARGIN: f32 = 300.0; // sides and top
pub const RECYCLE_MARGIN_BOTTOM: f32 = 120.0;

// Petals
pub const PETAL_PHASE_RATE: f32 = 0.002; // radians per ms at depth factor 1
pub const PETAL_SWAY_GAIN: f32 = 0.35;
pub const PETAL_SPAWN_X_OVERSCAN: f32 = 200.0;
pub const PETAL_SPAWN_Y_MIN: f32 = -250.0; // respawn band above the viewport
pub const PETAL_SPAWN_Y_MAX: f32 = -40.0;
pub const PETAL_PATH_EXTENT: f32 = 60.0; // half-size of the petal path in path units
pub const PETAL_BASE_PX: f32 = 22.0; // on-screen half-size at scale 1

// Depth mapping: value = base + depth * span (all increase toward the viewer)
pub const DEPTH_SIZE_BASE: f32 = 0.55;
pub const DEPTH_SIZE_SPAN: f32 = 0.75;
pub const DEPTH_SPEED_BASE: f32 = 0.45;
pub const DEPTH_SPEED_SPAN: f32 = 0.95;
pub const DEPTH_ALPHA_BASE: f32 = 0.45;
pub const DEPTH_ALPHA_SPAN: f32 = 0.55;

// Sparks
pub const SPARK_ALPHA_BASE: f32 = 0.08;
pub const SPARK_ALPHA_SWING: f32 = 0.05;
pub const SPARK_PHASE_RATE: f32 = 0.001;
pub const SPARK_FALL_SPEED: f32 = 0.12;
pub const SPARK_BOOST_COUNT: usize = 30;

// Hearts
pub const HEART_RISE_MIN: f32 = 0.5;
pub const HEART_RISE_MAX: f32 = 1.6;
pub const HEART_SPAWN_BELOW_MIN: f32 = 10.0;
pub const HEART_SPAWN_BELOW_MAX: f32 = 100.0; // must stay under RECYCLE_MARGIN_BOTTOM

// Confetti
pub const CONFETTI_MIN: usize = 60;
pub const CONFETTI_MAX: usize = 90;
pub const CONFETTI_SPEED_MIN: f32 = 2.0;
pub const CONFETTI_SPEED_MAX: f32 = 7.0;
pub const CONFETTI_LIFT: f32 = 2.5; // extra upward kick at spawn
pub const CONFETTI_GRAVITY: f32 = 0.12; // px per frame^2
pub const CONFETTI_TTL_MIN_MS: f32 = 1400.0;
pub const CONFETTI_TTL_MAX_MS: f32 = 2400.0;
