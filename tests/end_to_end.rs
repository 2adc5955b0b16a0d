//! Full scripted runs against the in-memory stage.

mod common;

use common::{fast_config, init_logger, MockCamera};
use mirror_booth::probe::BlindProber;
use mirror_booth::sequencer::Sequencer;
use mirror_booth::stage::memory::{MemoryStage, StageEventKind};
use mirror_booth::stage::Slot;
use mirror_booth::{
    Booth, BranchMode, CameraPlacement, CancelToken, Language, OutcomeChoice, RunOutcome,
    ScriptSet, VerdictTone,
};
use std::sync::Arc;

fn booth_on(stage: Arc<MemoryStage>, placement: CameraPlacement, branch: BranchMode) -> Booth {
    let mut config = fast_config();
    config.camera_placement = Some(placement);
    config.branch = Some(branch);
    Booth::new(stage, &config).with_prober(Arc::new(BlindProber))
}

/// Scenario A: primary language, probe degraded to placeholders, camera
/// disabled, protect pick.
#[tokio::test]
async fn choice_run_with_failed_probe_and_no_camera() {
    init_logger();
    let stage = Arc::new(MemoryStage::new());
    stage.push_language(Language::Primary);
    stage.push_choice(OutcomeChoice::Protect);

    let booth = booth_on(stage.clone(), CameraPlacement::Off, BranchMode::Choice);
    let outcome = Sequencer::new(booth, CancelToken::never()).run().await;
    assert_eq!(outcome, Ok(RunOutcome::Decided(OutcomeChoice::Protect)));

    let texts = stage.texts_written(Slot::Narrative);
    // Opening phrases rendered in deck order.
    let first_full = texts
        .iter()
        .position(|t| t == "Tu penses être protégé ?")
        .expect("first opening phrase fully typed");
    let second_full = texts
        .iter()
        .position(|t| t == "Et pourtant voilà ce qu’on a récupéré de ton appareil…")
        .expect("second opening phrase fully typed");
    assert!(first_full < second_full);

    // Device info fell back to the French placeholders, battery/location
    // lines dropped.
    assert!(texts.iter().any(|t| t.contains("Identifiant Appareil : Appareil inconnu")));
    assert!(texts.iter().any(|t| t.contains("Système : Système inconnu")));
    assert!(texts.iter().any(|t| t.contains("Navigateur : Navigateur inconnu")));
    assert!(!texts.iter().any(|t| t.contains("Batterie")));

    // Closing phrases made it out, then the choice prompt.
    assert!(texts.iter().any(|t| t == "Un hacker mettrait 30 secondes à faire pire."));
    let events = stage.events();
    let choice_at = events
        .iter()
        .position(|e| matches!(e.kind, StageEventKind::ChoicePresented { .. }))
        .expect("choice prompt shown");
    let verdict = events[choice_at..]
        .iter()
        .find_map(|e| match &e.kind {
            StageEventKind::VerdictPresented(v) => Some(v.clone()),
            _ => None,
        })
        .expect("verdict shown after the prompt");
    assert_eq!(verdict.tone, VerdictTone::Reassuring);
    assert_eq!(verdict.message, "Bonne idée, approche-toi d’un vendeur.");

    // Camera never ran in this configuration.
    assert!(!events
        .iter()
        .any(|e| matches!(e.kind, StageEventKind::SelfiePresented { .. })));
}

/// Scenario B: capture succeeds — the frame holds, fades, and the narrative
/// continues unaffected.
#[tokio::test]
async fn successful_capture_renders_then_run_continues() {
    init_logger();
    let stage = Arc::new(MemoryStage::new());
    stage.push_language(Language::Primary);
    stage.push_choice(OutcomeChoice::Ignore);

    let camera = MockCamera::granting();
    let booth = booth_on(stage.clone(), CameraPlacement::AfterDeviceInfo, BranchMode::Choice)
        .with_camera(camera.clone());
    let outcome = Sequencer::new(booth, CancelToken::never()).run().await;
    assert_eq!(outcome, Ok(RunOutcome::Decided(OutcomeChoice::Ignore)));

    let events = stage.events();
    let selfie_at = events
        .iter()
        .position(|e| matches!(e.kind, StageEventKind::SelfiePresented { .. }))
        .expect("selfie frame presented");
    let selfie_hidden_at = events[selfie_at..]
        .iter()
        .position(|e| matches!(e.kind, StageEventKind::Hidden(Slot::Selfie)))
        .expect("selfie faded out")
        + selfie_at;

    // The camera step sits between the device-info segment and the closing
    // segment: the first closing phrase only starts after the selfie is gone.
    let closing_start = events
        .iter()
        .position(|e| match &e.kind {
            StageEventKind::TextSet { slot: Slot::Narrative, text } => {
                "Un hacker mettrait 30 secondes à faire pire.".starts_with(text.as_str())
                    && !text.is_empty()
            }
            _ => false,
        })
        .expect("closing segment typed");
    assert!(selfie_hidden_at < closing_start, "selfie must fade before closing phrases");

    assert_eq!(camera.opened_streams(), 1);
    assert_eq!(camera.live_tracks(), 0, "no track may outlive the capture");

    // Verdict for Ignore is the grim one.
    let verdict = events
        .iter()
        .find_map(|e| match &e.kind {
            StageEventKind::VerdictPresented(v) => Some(v.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(verdict.tone, VerdictTone::Grim);
}

/// Scenario C: permission denied — no image, no failure surfaced, the run
/// reaches its verdict anyway.
#[tokio::test]
async fn denied_capture_skips_silently() {
    init_logger();
    let stage = Arc::new(MemoryStage::new());
    stage.push_language(Language::Secondary);
    stage.push_choice(OutcomeChoice::Protect);

    let camera = MockCamera::denying();
    let booth = booth_on(stage.clone(), CameraPlacement::AfterDeviceInfo, BranchMode::Choice)
        .with_camera(camera.clone());
    let outcome = Sequencer::new(booth, CancelToken::never()).run().await;
    assert_eq!(outcome, Ok(RunOutcome::Decided(OutcomeChoice::Protect)));

    let events = stage.events();
    assert!(!events
        .iter()
        .any(|e| matches!(e.kind, StageEventKind::SelfiePresented { .. })));
    assert_eq!(camera.live_tracks(), 0);
}

/// A deck can opt into a spoken failure: when `camera_failure_line` is set,
/// a denied capture types that line in-narrative, between the device block
/// and the closing phrases, and the run still reaches its verdict.
#[tokio::test]
async fn denied_capture_types_the_scripted_failure_line() {
    init_logger();
    let stage = Arc::new(MemoryStage::new());
    stage.push_language(Language::Primary);
    stage.push_choice(OutcomeChoice::Ignore);

    let failure_line = "Ta caméra nous a échappé… cette fois.";
    let mut scripts = ScriptSet::builtin();
    scripts.primary.camera_failure_line = Some(failure_line.to_string());

    let camera = MockCamera::denying();
    let booth = booth_on(stage.clone(), CameraPlacement::AfterDeviceInfo, BranchMode::Choice)
        .with_camera(camera.clone())
        .with_scripts(scripts);
    let outcome = Sequencer::new(booth, CancelToken::never()).run().await;
    assert_eq!(outcome, Ok(RunOutcome::Decided(OutcomeChoice::Ignore)));

    let texts = stage.texts_written(Slot::Narrative);
    let line_at = texts
        .iter()
        .position(|t| t == failure_line)
        .expect("failure line fully typed in the narrative slot");
    let device_at = texts
        .iter()
        .position(|t| t.contains("Identifiant Appareil"))
        .expect("device block typed");
    let closing_at = texts
        .iter()
        .position(|t| t == "Un hacker mettrait 30 secondes à faire pire.")
        .expect("closing segment typed");
    assert!(device_at < line_at && line_at < closing_at);

    // Still no selfie frame, and no track left behind.
    assert!(!stage
        .events()
        .iter()
        .any(|e| matches!(e.kind, StageEventKind::SelfiePresented { .. })));
    assert_eq!(camera.live_tracks(), 0);
}

/// No cross-language leakage: a Dutch run types only Dutch copy.
#[tokio::test]
async fn secondary_language_run_stays_in_its_deck() {
    init_logger();
    let stage = Arc::new(MemoryStage::new());
    stage.push_language(Language::Secondary);
    stage.push_choice(OutcomeChoice::Protect);

    let booth = booth_on(stage.clone(), CameraPlacement::Off, BranchMode::Choice);
    Sequencer::new(booth, CancelToken::never())
        .run()
        .await
        .unwrap();

    let texts = stage.texts_written(Slot::Narrative);
    assert!(texts.iter().any(|t| t == "Denk je dat je beschermd bent?"));
    assert!(
        !texts.iter().any(|t| t.contains("protégé") || t.contains("hacker mettrait")),
        "French copy leaked into a Dutch run"
    );
}

/// Card flips toggle the visual flag back and forth until the run is torn
/// down.
#[tokio::test]
async fn card_flips_toggle_until_cancelled() {
    init_logger();
    let stage = Arc::new(MemoryStage::new());
    stage.push_flip();
    stage.push_flip();

    let (handle, token) = mirror_booth::cancel_pair();
    let stage_dyn: Arc<dyn mirror_booth::Stage> = stage.clone();
    let flips = tokio::spawn(mirror_booth::sequencer::branch::card_flip_loop(
        stage_dyn, token,
    ));
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    handle.cancel();
    flips.await.unwrap();

    let toggles: Vec<bool> = stage
        .events()
        .into_iter()
        .filter_map(|e| match e.kind {
            StageEventKind::CardFlipped(v) => Some(v),
            _ => None,
        })
        .collect();
    assert_eq!(toggles, vec![true, false]);
}

/// Card branch: the run completes once the card is shown; no choice UI.
#[tokio::test]
async fn card_branch_completes_on_reveal() {
    init_logger();
    let stage = Arc::new(MemoryStage::new());
    stage.push_language(Language::Primary);

    let booth = booth_on(stage.clone(), CameraPlacement::Off, BranchMode::Card);
    let outcome = Sequencer::new(booth, CancelToken::never()).run().await;
    assert_eq!(outcome, Ok(RunOutcome::CardShown));

    let events = stage.events();
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, StageEventKind::CardPresented { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e.kind, StageEventKind::ChoicePresented { .. })));
}
