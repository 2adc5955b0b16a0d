//! The narrative state machine.
//!
//! Strictly linear: language pick → falling digits → opening phrases →
//! device-info reveal → optional camera snapshot → closing phrases → one of
//! the two terminal branches. The plan is data (`Vec<Step>`), built from
//! config, so "whether and where the camera runs" is a parameter instead of
//! a forked copy of the whole program.
//!
//! Ordering guarantee: step N+1 never starts before step N resolves — the
//! run is one `await` chain, and the sequencer is the only writer of the
//! narrative slot. Failure semantics: prober and camera failures degrade
//! the content and the run continues; the only aborts are cancellation and
//! a closed input source.

use crate::core::booth::Booth;
use crate::core::cancel::CancelToken;
use crate::core::error::BoothError;
use crate::core::types::{CameraPlacement, Language, RunOutcome};
use crate::fx::fade;
use crate::fx::rain;
use crate::fx::typewriter::{RevealMode, RevealOutcome, Typewriter};
use crate::script::PhraseScript;
use crate::stage::Slot;
use std::time::Duration;
use tracing::{debug, info};

pub mod branch;

/// Pause between two phrases of a segment, after the fade. Matches the
/// original's inter-phrase beat.
const PHRASE_GAP: Duration = Duration::from_millis(500);

/// One run's mutable state: the language picked at the gate and how far the
/// plan has advanced. Recreated per run, nothing survives it.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub language: Language,
    pub step_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentId {
    Opening,
    DeviceInfo,
    Closing,
}

/// A step descriptor. The narrative is an ordered list of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    StartRain,
    Segment(SegmentId),
    CameraCapture,
    Branch,
}

/// Assemble the plan for a given camera placement. Always ends in `Branch`.
pub fn build_plan(placement: CameraPlacement) -> Vec<Step> {
    let mut plan = vec![Step::StartRain, Step::Segment(SegmentId::Opening)];
    if placement == CameraPlacement::BeforeDeviceInfo {
        plan.push(Step::CameraCapture);
    }
    plan.push(Step::Segment(SegmentId::DeviceInfo));
    if placement == CameraPlacement::AfterDeviceInfo {
        plan.push(Step::CameraCapture);
    }
    plan.push(Step::Segment(SegmentId::Closing));
    plan.push(Step::Branch);
    plan
}

pub struct Sequencer {
    booth: Booth,
    typewriter: Typewriter,
    cancel: CancelToken,
}

impl Sequencer {
    pub fn new(booth: Booth, cancel: CancelToken) -> Self {
        Self {
            booth,
            typewriter: Typewriter::new(),
            cancel,
        }
    }

    /// Drive one full presentation, from the language gate to the terminal
    /// branch. Resolves with how the run ended; the only error paths are
    /// cancellation and a closed input source.
    pub async fn run(&self) -> Result<RunOutcome, BoothError> {
        let stage = self.booth.stage.as_ref();

        // Idle → LanguageSelected. The pick is the only input before the
        // terminal branch; further language input is dead after this.
        info!("sequencer: waiting for language pick");
        let language = tokio::select! {
            picked = stage.await_language() => picked.ok_or(BoothError::InputClosed)?,
            _ = self.cancel.cancelled() => return Err(BoothError::Cancelled),
        };
        info!("sequencer: language selected: {:?}", language);
        fade::fade_out(
            stage,
            Slot::LanguagePicker,
            self.booth.timings.fade_out,
            &self.cancel,
        )
        .await;

        let script = self.booth.scripts.for_language(language).clone();

        // Exactly one probe per run, resolved before the device-info
        // segment renders. The probe contract: it never fails.
        let snapshot = self.booth.prober.probe(language).await;
        let device_lines = script.render_device_info(&snapshot);

        let mut session = Session {
            language,
            step_index: 0,
        };
        let plan = build_plan(self.booth.camera_placement);

        for step in &plan {
            if self.cancel.is_cancelled() {
                return Err(BoothError::Cancelled);
            }
            debug!("sequencer: step {} — {:?}", session.step_index, step);
            match step {
                Step::StartRain => {
                    let field = rain::generate_field(self.booth.rain_glyphs);
                    stage.start_rain(&field).await;
                }
                Step::Segment(SegmentId::Opening) => {
                    self.play_sequential(&script.opening).await?;
                }
                Step::Segment(SegmentId::DeviceInfo) => {
                    self.play_stacked(&device_lines).await?;
                }
                Step::Segment(SegmentId::Closing) => {
                    self.play_sequential(&script.closing).await?;
                }
                Step::CameraCapture => {
                    self.camera_step(&script).await?;
                }
                Step::Branch => {
                    return branch::run_branch(&self.booth, &script, &self.cancel).await;
                }
            }
            session.step_index += 1;
        }

        // Plans built here always end in Branch; only a cancelled run falls
        // through.
        Err(BoothError::Cancelled)
    }

    /// Sequential segment: type each phrase, hold it for the read delay,
    /// fade it out, breathe, type the next.
    async fn play_sequential(&self, lines: &[String]) -> Result<(), BoothError> {
        let stage = self.booth.stage.as_ref();
        let t = self.booth.timings;
        for (i, line) in lines.iter().enumerate() {
            self.reveal(line, RevealMode::Replace).await?;
            self.hold(t.read_hold).await?;
            fade::fade_out_text(stage, Slot::Narrative, t.fade_out, &self.cancel).await;
            if i + 1 < lines.len() {
                self.hold(PHRASE_GAP).await?;
            }
        }
        Ok(())
    }

    /// Stacked segment (device info): lines accumulate on the slot with a
    /// beat between them, then the whole block holds and fades at once.
    async fn play_stacked(&self, lines: &[String]) -> Result<(), BoothError> {
        if lines.is_empty() {
            // Fully degraded probe — nothing to type, nothing to fade.
            return Ok(());
        }
        let stage = self.booth.stage.as_ref();
        let t = self.booth.timings;
        for (i, line) in lines.iter().enumerate() {
            let mode = if i == 0 {
                RevealMode::Replace
            } else {
                RevealMode::Append
            };
            self.reveal(line, mode).await?;
            if i + 1 < lines.len() {
                self.hold(PHRASE_GAP).await?;
                let current = stage.text(Slot::Narrative).await;
                stage.set_text(Slot::Narrative, &format!("{current}\n")).await;
            }
        }
        self.hold(t.read_hold).await?;
        fade::fade_out_text(stage, Slot::Narrative, t.fade_out, &self.cancel).await;
        Ok(())
    }

    /// Camera step: capture, and on success hold the framed selfie before
    /// fading it away. A failed capture skips the hold entirely; whether it
    /// types a "camera inaccessible" line is up to the script.
    async fn camera_step(&self, script: &PhraseScript) -> Result<(), BoothError> {
        let stage = self.booth.stage.as_ref();
        let t = self.booth.timings;
        let result =
            crate::camera::capture(self.booth.camera.as_ref(), t.camera_settle, &self.cancel).await;

        if self.cancel.is_cancelled() {
            return Err(BoothError::Cancelled);
        }

        if result.succeeded {
            stage
                .present_selfie(&result, &script.selfie_caption, &script.selfie_disclaimer)
                .await;
            fade::fade_in(stage, Slot::Selfie, t.fade_in, &self.cancel).await;
            self.hold(t.camera_hold).await?;
            fade::fade_out(stage, Slot::Selfie, t.fade_out, &self.cancel).await;
        } else if let Some(line) = &script.camera_failure_line {
            self.play_sequential(std::slice::from_ref(line)).await?;
        } else {
            info!("sequencer: capture failed, continuing without a selfie");
        }
        Ok(())
    }

    async fn reveal(&self, text: &str, mode: RevealMode) -> Result<(), BoothError> {
        match self
            .typewriter
            .reveal(
                self.booth.stage.as_ref(),
                Slot::Narrative,
                text,
                mode,
                self.booth.timings.type_interval,
                &self.cancel,
            )
            .await
        {
            RevealOutcome::Completed => Ok(()),
            RevealOutcome::Cancelled => Err(BoothError::Cancelled),
        }
    }

    async fn hold(&self, duration: Duration) -> Result<(), BoothError> {
        if self.cancel.sleep(duration).await {
            Ok(())
        } else {
            Err(BoothError::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_places_camera_after_device_info_by_default() {
        let plan = build_plan(CameraPlacement::AfterDeviceInfo);
        assert_eq!(
            plan,
            vec![
                Step::StartRain,
                Step::Segment(SegmentId::Opening),
                Step::Segment(SegmentId::DeviceInfo),
                Step::CameraCapture,
                Step::Segment(SegmentId::Closing),
                Step::Branch,
            ]
        );
    }

    #[test]
    fn plan_can_move_or_drop_the_camera_step() {
        let before = build_plan(CameraPlacement::BeforeDeviceInfo);
        assert_eq!(before[2], Step::CameraCapture);
        assert_eq!(before[3], Step::Segment(SegmentId::DeviceInfo));

        let off = build_plan(CameraPlacement::Off);
        assert!(!off.contains(&Step::CameraCapture));
        assert_eq!(*off.last().unwrap(), Step::Branch);
    }
}
