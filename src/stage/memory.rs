//! Headless in-memory stage.
//!
//! Records every call with a monotonic timestamp so a scripted run can be
//! replayed and asserted on (step ordering, slot ownership, copy isolation).
//! Visitor input is queued ahead of time through the `push_*` methods, which
//! makes the whole presentation drivable from a test or a `--headless` demo
//! without a terminal.

use crate::core::types::{CaptureResult, Language, OutcomeChoice, Verdict};
use crate::fx::rain::RainGlyph;
use crate::stage::{Slot, Stage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;
use tokio::sync::mpsc;

/// One recorded surface call.
#[derive(Debug, Clone)]
pub struct StageEvent {
    /// Time since stage creation.
    pub at: std::time::Duration,
    pub kind: StageEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageEventKind {
    TextSet { slot: Slot, text: String },
    OpacitySet { slot: Slot, opacity: f32 },
    Shown(Slot),
    Hidden(Slot),
    Caret(bool),
    SelfiePresented { caption: String, disclaimer: String },
    ChoicePresented { prompt: String },
    VerdictPresented(Verdict),
    CardPresented { front: String, back: String },
    CardFlipped(bool),
    RainStarted { glyphs: usize },
}

#[derive(Debug, Default, Clone)]
struct SlotState {
    text: String,
    opacity: f32,
    visible: bool,
}

pub struct MemoryStage {
    started: Instant,
    slots: Mutex<HashMap<Slot, SlotState>>,
    events: Mutex<Vec<StageEvent>>,
    lang_tx: mpsc::UnboundedSender<Language>,
    lang_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Language>>,
    choice_tx: mpsc::UnboundedSender<OutcomeChoice>,
    choice_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<OutcomeChoice>>,
    flip_tx: mpsc::UnboundedSender<()>,
    flip_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<()>>,
}

impl Default for MemoryStage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStage {
    pub fn new() -> Self {
        let (lang_tx, lang_rx) = mpsc::unbounded_channel();
        let (choice_tx, choice_rx) = mpsc::unbounded_channel();
        let (flip_tx, flip_rx) = mpsc::unbounded_channel();
        Self {
            started: Instant::now(),
            slots: Mutex::new(HashMap::new()),
            events: Mutex::new(Vec::new()),
            lang_tx,
            lang_rx: tokio::sync::Mutex::new(lang_rx),
            choice_tx,
            choice_rx: tokio::sync::Mutex::new(choice_rx),
            flip_tx,
            flip_rx: tokio::sync::Mutex::new(flip_rx),
        }
    }

    // ── Scripted input ────────────────────────────────────────────────────

    pub fn push_language(&self, language: Language) {
        let _ = self.lang_tx.send(language);
    }

    pub fn push_choice(&self, choice: OutcomeChoice) {
        let _ = self.choice_tx.send(choice);
    }

    pub fn push_flip(&self) {
        let _ = self.flip_tx.send(());
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// Snapshot of everything recorded so far, in call order.
    pub fn events(&self) -> Vec<StageEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Every `TextSet` payload written to `slot`, in order. Handy for
    /// asserting which copy deck a run drew from.
    pub fn texts_written(&self, slot: Slot) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e.kind {
                StageEventKind::TextSet { slot: s, text } if s == slot => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn current_text(&self, slot: Slot) -> String {
        self.slots
            .lock()
            .unwrap()
            .get(&slot)
            .map(|s| s.text.clone())
            .unwrap_or_default()
    }

    fn record(&self, kind: StageEventKind) {
        self.events.lock().unwrap().push(StageEvent {
            at: self.started.elapsed(),
            kind,
        });
    }

    fn with_slot(&self, slot: Slot, f: impl FnOnce(&mut SlotState)) {
        let mut slots = self.slots.lock().unwrap();
        f(slots.entry(slot).or_default());
    }
}

#[async_trait]
impl Stage for MemoryStage {
    async fn set_text(&self, slot: Slot, text: &str) {
        self.with_slot(slot, |s| s.text = text.to_string());
        self.record(StageEventKind::TextSet {
            slot,
            text: text.to_string(),
        });
    }

    async fn text(&self, slot: Slot) -> String {
        self.current_text(slot)
    }

    async fn set_opacity(&self, slot: Slot, opacity: f32) {
        self.with_slot(slot, |s| s.opacity = opacity);
        self.record(StageEventKind::OpacitySet { slot, opacity });
    }

    async fn show(&self, slot: Slot) {
        self.with_slot(slot, |s| s.visible = true);
        self.record(StageEventKind::Shown(slot));
    }

    async fn hide(&self, slot: Slot) {
        self.with_slot(slot, |s| s.visible = false);
        self.record(StageEventKind::Hidden(slot));
    }

    async fn is_visible(&self, slot: Slot) -> bool {
        self.slots
            .lock()
            .unwrap()
            .get(&slot)
            .map(|s| s.visible)
            .unwrap_or(false)
    }

    async fn set_caret(&self, visible: bool) {
        self.record(StageEventKind::Caret(visible));
    }

    async fn present_selfie(&self, _frame: &CaptureResult, caption: &str, disclaimer: &str) {
        self.with_slot(Slot::Selfie, |s| s.visible = true);
        self.record(StageEventKind::SelfiePresented {
            caption: caption.to_string(),
            disclaimer: disclaimer.to_string(),
        });
    }

    async fn present_choice(&self, prompt: &str, _protect_label: &str, _ignore_label: &str) {
        self.with_slot(Slot::Choice, |s| s.visible = true);
        self.record(StageEventKind::ChoicePresented {
            prompt: prompt.to_string(),
        });
    }

    async fn present_verdict(&self, verdict: &Verdict) {
        self.with_slot(Slot::Verdict, |s| s.visible = true);
        self.record(StageEventKind::VerdictPresented(verdict.clone()));
    }

    async fn present_card(&self, front: &str, back: &str) {
        self.with_slot(Slot::Card, |s| s.visible = true);
        self.record(StageEventKind::CardPresented {
            front: front.to_string(),
            back: back.to_string(),
        });
    }

    async fn set_card_flipped(&self, flipped: bool) {
        self.record(StageEventKind::CardFlipped(flipped));
    }

    async fn start_rain(&self, field: &[RainGlyph]) {
        self.record(StageEventKind::RainStarted {
            glyphs: field.len(),
        });
    }

    async fn await_language(&self) -> Option<Language> {
        self.lang_rx.lock().await.recv().await
    }

    async fn await_choice(&self) -> Option<OutcomeChoice> {
        self.choice_rx.lock().await.recv().await
    }

    async fn await_flip(&self) -> Option<()> {
        self.flip_rx.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order_with_monotonic_timestamps() {
        let stage = MemoryStage::new();
        stage.set_text(Slot::Narrative, "a").await;
        stage.show(Slot::Narrative).await;
        stage.hide(Slot::Narrative).await;
        let events = stage.events();
        assert_eq!(events.len(), 3);
        assert!(events.windows(2).all(|w| w[0].at <= w[1].at));
        assert!(!stage.is_visible(Slot::Narrative).await);
    }

    #[tokio::test]
    async fn scripted_input_is_delivered_fifo() {
        let stage = MemoryStage::new();
        stage.push_language(Language::Secondary);
        stage.push_choice(OutcomeChoice::Ignore);
        assert_eq!(stage.await_language().await, Some(Language::Secondary));
        assert_eq!(stage.await_choice().await, Some(OutcomeChoice::Ignore));
    }
}
