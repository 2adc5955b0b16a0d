//! The display surface the sequencer talks to.
//!
//! This module is the seam that makes the engine headless-first: the
//! sequencer, typewriter, and fades only ever see the [`Stage`] trait. Two
//! surfaces ship in-tree:
//! * [`term::TerminalStage`] — the real kiosk, drawn with crossterm.
//! * [`memory::MemoryStage`] — headless, records every call with a
//!   timestamp; used for dry runs and by the ordering tests.
//!
//! Ownership rule: the sequencer is the only caller of the mutating methods
//! while a run is live, so no two steps ever write a slot concurrently.

use crate::core::types::{CaptureResult, Language, OutcomeChoice, Verdict};
use crate::fx::rain::RainGlyph;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod term;

/// The fixed set of display regions. Mirrors the original kiosk layout:
/// a language picker, one narrative text slot, the selfie frame, and the
/// terminal-branch surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    LanguagePicker,
    Narrative,
    Selfie,
    Choice,
    Verdict,
    Card,
}

/// Async display surface. All methods are infallible by contract: a surface
/// that loses its backing (closed terminal) reports it through the input
/// methods returning `None`, never by panicking mid-draw.
#[async_trait]
pub trait Stage: Send + Sync {
    // ── Slot primitives (typewriter / fade building blocks) ──────────────

    async fn set_text(&self, slot: Slot, text: &str);
    async fn text(&self, slot: Slot) -> String;
    /// Opacity in 0.0–1.0. Surfaces map this however they can (the terminal
    /// dims colors); the value itself is what the fades step through.
    async fn set_opacity(&self, slot: Slot, opacity: f32);
    async fn show(&self, slot: Slot);
    async fn hide(&self, slot: Slot);
    async fn is_visible(&self, slot: Slot) -> bool;
    /// Typing caret, visible only while a reveal is in flight.
    async fn set_caret(&self, visible: bool);

    // ── Composite presentations ──────────────────────────────────────────

    /// Render the captured frame inside the styled selfie frame with its
    /// caption above and disclaimer below. Only called on success.
    async fn present_selfie(&self, frame: &CaptureResult, caption: &str, disclaimer: &str);
    async fn present_choice(&self, prompt: &str, protect_label: &str, ignore_label: &str);
    async fn present_verdict(&self, verdict: &Verdict);
    async fn present_card(&self, front: &str, back: &str);
    async fn set_card_flipped(&self, flipped: bool);
    /// Hand the falling-digits field to the surface; the surface owns the
    /// animation from here on.
    async fn start_rain(&self, field: &[RainGlyph]);

    // ── Visitor input ────────────────────────────────────────────────────
    //
    // `None` means the input source is gone (terminal closed, script
    // exhausted); the sequencer treats that as an aborted run.

    async fn await_language(&self) -> Option<Language>;
    async fn await_choice(&self) -> Option<OutcomeChoice>;
    async fn await_flip(&self) -> Option<()>;
}
