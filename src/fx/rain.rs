use rand::RngExt;
use serde::{Deserialize, Serialize};

// ── Falling-digits background field ──────────────────────────────────────────
//
// Pure data generation: the stage decides how to animate the field (the
// terminal surface drifts glyphs down the screen, the in-memory surface just
// records it). Positions are percentages so the field is resolution-free.

/// One glyph of the falling-digits effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainGlyph {
    pub glyph: char,
    /// Horizontal position, 0.0–100.0 percent.
    pub col_pct: f32,
    /// Initial vertical position, 0.0–100.0 percent.
    pub row_pct: f32,
    /// Start offset before this glyph begins falling.
    pub delay_ms: u64,
    /// One full top-to-bottom pass.
    pub duration_ms: u64,
}

const RAIN_CHARSET: &[char] = &['0', '1'];

/// Generate a randomized glyph field of `count` digits.
pub fn generate_field(count: usize) -> Vec<RainGlyph> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| RainGlyph {
            glyph: RAIN_CHARSET[rng.random_range(0..RAIN_CHARSET.len())],
            col_pct: rng.random_range(0.0..100.0),
            row_pct: rng.random_range(0.0..100.0),
            delay_ms: rng.random_range(0..2000),
            duration_ms: rng.random_range(1000..4000),
        })
        .collect()
}
