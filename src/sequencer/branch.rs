//! Terminal presentations.
//!
//! Exactly one of the two runs per booth, picked by config: the two-button
//! protect/ignore prompt ending in a fixed verdict, or the reward card that
//! flips on every tap. Never both.

use crate::core::booth::Booth;
use crate::core::cancel::CancelToken;
use crate::core::error::BoothError;
use crate::core::types::{BranchMode, OutcomeChoice, RunOutcome};
use crate::fx::fade;
use crate::script::PhraseScript;
use crate::stage::{Slot, Stage};
use std::sync::Arc;
use tracing::info;

pub async fn run_branch(
    booth: &Booth,
    script: &PhraseScript,
    cancel: &CancelToken,
) -> Result<RunOutcome, BoothError> {
    // The narrative slot is done for good; both branches start clean.
    fade::fade_out(
        booth.stage.as_ref(),
        Slot::Narrative,
        booth.timings.fade_out,
        cancel,
    )
    .await;

    match booth.branch {
        BranchMode::Choice => choice_prompt(booth, script, cancel).await,
        BranchMode::Card => card_reveal(booth, script, cancel).await,
    }
}

/// Two buttons, one click, one fixed verdict. No undo, no second round.
async fn choice_prompt(
    booth: &Booth,
    script: &PhraseScript,
    cancel: &CancelToken,
) -> Result<RunOutcome, BoothError> {
    let stage = booth.stage.as_ref();
    let copy = &script.choice;

    stage
        .present_choice(&copy.prompt, &copy.protect_label, &copy.ignore_label)
        .await;

    let choice = tokio::select! {
        picked = stage.await_choice() => picked.ok_or(BoothError::InputClosed)?,
        _ = cancel.cancelled() => return Err(BoothError::Cancelled),
    };
    info!("branch: visitor chose {:?}", choice);

    fade::fade_out(stage, Slot::Choice, booth.timings.fade_out, cancel).await;

    let verdict = match choice {
        OutcomeChoice::Protect => &copy.protect_verdict,
        OutcomeChoice::Ignore => &copy.ignore_verdict,
    };
    stage.present_verdict(verdict).await;

    Ok(RunOutcome::Decided(choice))
}

/// Reward card. The run is complete once the card is up; flips are a
/// cosmetic loop that keeps running in the background until cancellation.
async fn card_reveal(
    booth: &Booth,
    script: &PhraseScript,
    cancel: &CancelToken,
) -> Result<RunOutcome, BoothError> {
    let stage = booth.stage.as_ref();
    stage
        .present_card(&script.card.front, &script.card.back)
        .await;
    info!("branch: reward card revealed");

    tokio::spawn(card_flip_loop(booth.stage.clone(), cancel.clone()));
    Ok(RunOutcome::CardShown)
}

/// Toggle the flipped flag on every tap, forever. Ends when the input
/// source closes or the run is cancelled.
pub async fn card_flip_loop(stage: Arc<dyn Stage>, cancel: CancelToken) {
    let mut flipped = false;
    loop {
        tokio::select! {
            tap = stage.await_flip() => match tap {
                Some(()) => {
                    flipped = !flipped;
                    stage.set_card_flipped(flipped).await;
                }
                None => break,
            },
            _ = cancel.cancelled() => break,
        }
    }
}
