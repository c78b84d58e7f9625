// Host-side tests for the front end's page wiring constants.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
fn element_ids_are_distinct_and_non_empty() {
    let ids = [
        AUDIO_ID,
        PETAL_CANVAS_ID,
        SPARKLE_CANVAS_ID,
        HINT_ID,
        MUSIC_TOGGLE_ID,
        SURPRISE_ID,
    ];
    for (i, a) in ids.iter().enumerate() {
        assert!(!a.is_empty());
        assert!(!a.starts_with('#'), "ids are looked up without the selector prefix");
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn surprise_sparks_outlast_a_confetti_burst() {
    assert!(SURPRISE_SPARK_MS >= card_core::constants::CONFETTI_TTL_MAX_MS as f64);
    assert_ne!(HIDDEN_CLASS, PLAYING_CLASS);
}
