//! Letter-by-letter reveal effect.
//!
//! Displays progressively longer prefixes of a phrase at a fixed cadence
//! (default 30 ms/char, see `BoothConfig`). The original kiosks left the
//! behavior of two overlapping reveals on one slot undefined; here a new
//! reveal supersedes the in-flight one via a generation counter — the
//! superseded call resolves as `Cancelled` and never touches the slot again.

use crate::core::cancel::CancelToken;
use crate::stage::{Slot, Stage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    /// Clear the slot first.
    Replace,
    /// Keep what is already there and type after it (multi-line stacks).
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The full phrase is on the slot.
    Completed,
    /// Superseded by a newer reveal or the run was cancelled; the slot is
    /// left wherever the interruption found it.
    Cancelled,
}

/// One typewriter per display slot. The sequencer owns it; nothing else
/// writes the slot while a run is live.
#[derive(Debug, Default)]
pub struct Typewriter {
    generation: AtomicU64,
}

impl Typewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reveal `text` on `slot`, one character per `interval` tick.
    ///
    /// Resolves exactly once, after the final character is shown (or on
    /// interruption). The caret is shown for the duration of the reveal.
    pub async fn reveal(
        &self,
        stage: &dyn Stage,
        slot: Slot,
        text: &str,
        mode: RevealMode,
        interval: Duration,
        cancel: &CancelToken,
    ) -> RevealOutcome {
        let my_gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let prefix = match mode {
            RevealMode::Replace => {
                stage.set_text(slot, "").await;
                String::new()
            }
            RevealMode::Append => stage.text(slot).await,
        };

        stage.set_opacity(slot, 1.0).await;
        stage.show(slot).await;
        stage.set_caret(true).await;

        // char_indices keeps the prefixes on UTF-8 boundaries; the copy decks
        // are full of accented characters.
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .skip(1)
            .chain(std::iter::once(text.len()))
            .collect();

        for end in boundaries {
            if cancel.is_cancelled() || self.generation.load(Ordering::SeqCst) != my_gen {
                return RevealOutcome::Cancelled;
            }
            stage
                .set_text(slot, &format!("{prefix}{}", &text[..end]))
                .await;
            if !cancel.sleep(interval).await {
                return RevealOutcome::Cancelled;
            }
        }

        if self.generation.load(Ordering::SeqCst) != my_gen {
            return RevealOutcome::Cancelled;
        }
        stage.set_caret(false).await;
        RevealOutcome::Completed
    }
}
