//! Step-ordering properties, asserted on the recorded event log.

mod common;

use common::{fast_config, init_logger, MockCamera};
use mirror_booth::probe::BlindProber;
use mirror_booth::sequencer::Sequencer;
use mirror_booth::stage::memory::{MemoryStage, StageEventKind};
use mirror_booth::stage::Slot;
use mirror_booth::{Booth, BranchMode, CameraPlacement, CancelToken, Language, OutcomeChoice};
use std::sync::Arc;

async fn recorded_run(placement: CameraPlacement) -> Arc<MemoryStage> {
    let stage = Arc::new(MemoryStage::new());
    stage.push_language(Language::Primary);
    stage.push_choice(OutcomeChoice::Protect);

    let mut config = fast_config();
    config.camera_placement = Some(placement);
    config.branch = Some(BranchMode::Choice);
    let booth = Booth::new(stage.clone(), &config)
        .with_prober(Arc::new(BlindProber))
        .with_camera(MockCamera::granting());
    Sequencer::new(booth, CancelToken::never())
        .run()
        .await
        .unwrap();
    stage
}

/// Timestamps never run backwards: the run is one await chain.
#[tokio::test]
async fn event_timestamps_are_monotonic() {
    init_logger();
    let stage = recorded_run(CameraPlacement::AfterDeviceInfo).await;
    let events = stage.events();
    assert!(events.len() > 20, "a full run leaves a substantial log");
    assert!(
        events.windows(2).all(|w| w[0].at <= w[1].at),
        "event log must be time-ordered"
    );
}

/// The rain starts before any narrative typing, and every narrative phrase
/// completes (slot hidden) before the next one starts.
#[tokio::test]
async fn steps_never_overlap() {
    init_logger();
    let stage = recorded_run(CameraPlacement::AfterDeviceInfo).await;
    let events = stage.events();

    let rain_at = events
        .iter()
        .position(|e| matches!(e.kind, StageEventKind::RainStarted { .. }))
        .expect("rain started");
    let first_type = events
        .iter()
        .position(|e| {
            matches!(
                &e.kind,
                StageEventKind::TextSet { slot: Slot::Narrative, text } if !text.is_empty()
            )
        })
        .expect("narrative typed");
    assert!(rain_at < first_type, "rain starts before the first phrase");

    // Between any two full phrases there is a Hidden(Narrative): the fade
    // of phrase N completes before phrase N+1 begins.
    let full_phrases = [
        "Tu penses être protégé ?",
        "Et pourtant voilà ce qu’on a récupéré de ton appareil…",
        "Un hacker mettrait 30 secondes à faire pire.",
        "C’est pour ça qu’on a créé le Digital Service Pack.",
    ];
    for pair in full_phrases.windows(2) {
        let done = events
            .iter()
            .position(|e| {
                matches!(&e.kind, StageEventKind::TextSet { text, .. } if text == pair[0])
            })
            .unwrap_or_else(|| panic!("phrase not fully typed: {}", pair[0]));
        let next_start = events
            .iter()
            .position(|e| {
                matches!(&e.kind, StageEventKind::TextSet { text, .. } if pair[1].starts_with(text.as_str()) && !text.is_empty())
            })
            .unwrap_or_else(|| panic!("phrase never started: {}", pair[1]));
        let hidden_between = events[done..next_start]
            .iter()
            .any(|e| matches!(e.kind, StageEventKind::Hidden(Slot::Narrative)));
        assert!(
            done < next_start && hidden_between,
            "phrase «{}» must fade out before «{}» starts",
            pair[0],
            pair[1]
        );
    }
}

/// Camera placement is honored: `before_device_info` puts the selfie ahead
/// of the device block, `after_device_info` behind it.
#[tokio::test]
async fn camera_placement_is_configuration() {
    init_logger();
    for (placement, expect_before) in [
        (CameraPlacement::BeforeDeviceInfo, true),
        (CameraPlacement::AfterDeviceInfo, false),
    ] {
        let stage = recorded_run(placement).await;
        let events = stage.events();
        let selfie_at = events
            .iter()
            .position(|e| matches!(e.kind, StageEventKind::SelfiePresented { .. }))
            .expect("selfie presented");
        let device_at = events
            .iter()
            .position(|e| {
                matches!(&e.kind, StageEventKind::TextSet { text, .. } if text.contains("Identifiant Appareil"))
            })
            .expect("device block typed");
        assert_eq!(
            selfie_at < device_at,
            expect_before,
            "placement {:?} not honored",
            placement
        );
    }
}

/// The caret is only ever up while a reveal is running: every show is
/// eventually followed by a hide, and the log never shows two shows in a row.
#[tokio::test]
async fn caret_toggles_pair_up() {
    init_logger();
    let stage = recorded_run(CameraPlacement::Off).await;
    let carets: Vec<bool> = stage
        .events()
        .into_iter()
        .filter_map(|e| match e.kind {
            StageEventKind::Caret(v) => Some(v),
            _ => None,
        })
        .collect();
    assert!(!carets.is_empty());
    assert!(carets[0], "first toggle shows the caret");
    for pair in carets.windows(2) {
        assert!(
            !(pair[0] && pair[1]),
            "caret shown twice with no hide in between"
        );
    }
    assert_eq!(carets.last(), Some(&false), "caret down at rest");
}
