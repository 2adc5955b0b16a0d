//! Opacity transitions.
//!
//! A fade steps a slot's opacity between 0.0 and 1.0 over a configured
//! duration, then flips the visibility flag. Fading out an already-hidden
//! slot is idempotent: it resolves immediately without re-animating.

use crate::core::cancel::CancelToken;
use crate::stage::{Slot, Stage};
use std::time::Duration;

/// Number of opacity steps per transition. The duration is what the config
/// controls; the step count only affects smoothness.
const FADE_STEPS: u32 = 8;

/// Drive `slot` from opaque to invisible, then hide it.
pub async fn fade_out(stage: &dyn Stage, slot: Slot, duration: Duration, cancel: &CancelToken) {
    if !stage.is_visible(slot).await {
        return; // already gone — nothing to animate
    }
    let tick = duration / FADE_STEPS;
    for step in (0..FADE_STEPS).rev() {
        stage
            .set_opacity(slot, step as f32 / FADE_STEPS as f32)
            .await;
        if !cancel.sleep(tick).await {
            break;
        }
    }
    stage.hide(slot).await;
}

/// Fade out the narrative slot and reset it for the next phrase: caret off,
/// text cleared, opacity restored. Mirrors what the original did between
/// every two phrases.
pub async fn fade_out_text(stage: &dyn Stage, slot: Slot, duration: Duration, cancel: &CancelToken) {
    fade_out(stage, slot, duration, cancel).await;
    stage.set_caret(false).await;
    stage.set_text(slot, "").await;
    stage.set_opacity(slot, 1.0).await;
}

/// Show `slot` and drive it from invisible to opaque.
pub async fn fade_in(stage: &dyn Stage, slot: Slot, duration: Duration, cancel: &CancelToken) {
    stage.set_opacity(slot, 0.0).await;
    stage.show(slot).await;
    let tick = duration / FADE_STEPS;
    for step in 1..=FADE_STEPS {
        stage
            .set_opacity(slot, step as f32 / FADE_STEPS as f32)
            .await;
        if !cancel.sleep(tick).await {
            break;
        }
    }
    stage.set_opacity(slot, 1.0).await;
}
