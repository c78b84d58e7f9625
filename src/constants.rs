/// Page wiring for the browser front end.
///
/// Element ids match the card's HTML; everything tunable about the animation
/// itself lives in `card_core::constants`.
// Required elements
pub const AUDIO_ID: &str = "bgAudio";
pub const PETAL_CANVAS_ID: &str = "petalCanvas";
pub const SPARKLE_CANVAS_ID: &str = "sparkleCanvas";

// Optional elements
pub const HINT_ID: &str = "hintTap";
pub const MUSIC_TOGGLE_ID: &str = "music-toggle";
pub const SURPRISE_ID: &str = "surprise";

// Classes toggled on optional elements
pub const HIDDEN_CLASS: &str = "hidden";
pub const PLAYING_CLASS: &str = "playing";

// How long a surprise keeps the extra sparks around (ms)
pub const SURPRISE_SPARK_MS: f64 = 2_500.0;

// Seed for the particle RNG when the clock gives nothing useful
pub const FALLBACK_SEED: u64 = 0x5eed_20_10;
