//! Custom deck loading from disk, and the booth's fallback when the file
//! is missing or garbled.

mod common;

use common::{fast_config, init_logger};
use mirror_booth::script::{ScriptError, ScriptSet};
use mirror_booth::stage::memory::MemoryStage;
use mirror_booth::Booth;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn custom_deck_loads_from_a_json_file() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("decks.json");

    let mut deck = ScriptSet::builtin();
    deck.primary.opening[0] = "Phrase maison.".to_string();
    deck.primary.camera_failure_line = Some("Pas de caméra ici.".to_string());
    fs::write(&path, serde_json::to_string(&deck).unwrap()).unwrap();

    let loaded = ScriptSet::from_json_file(&path).unwrap();
    assert_eq!(loaded.primary.opening[0], "Phrase maison.");
    assert_eq!(
        loaded.primary.camera_failure_line.as_deref(),
        Some("Pas de caméra ici.")
    );
    assert_eq!(loaded.secondary.card.back, deck.secondary.card.back);
}

#[test]
fn missing_and_garbled_files_map_to_their_errors() {
    let tmp = TempDir::new().expect("create temp dir");

    let missing = tmp.path().join("nope.json");
    assert!(matches!(
        ScriptSet::from_json_file(&missing),
        Err(ScriptError::Io { .. })
    ));

    let garbled = tmp.path().join("garbled.json");
    fs::write(&garbled, "{ this is not a deck").unwrap();
    assert!(matches!(
        ScriptSet::from_json_file(&garbled),
        Err(ScriptError::Parse { .. })
    ));
}

/// `script_path` pointing at a valid file swaps the decks wholesale.
#[test]
fn booth_picks_up_a_valid_custom_deck() {
    init_logger();
    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("decks.json");

    let mut deck = ScriptSet::builtin();
    deck.secondary.opening[0] = "Eigen openingszin.".to_string();
    fs::write(&path, serde_json::to_string(&deck).unwrap()).unwrap();

    let mut config = fast_config();
    config.script_path = Some(path.display().to_string());
    let booth = Booth::new(Arc::new(MemoryStage::new()), &config);

    assert_eq!(booth.scripts.secondary.opening[0], "Eigen openingszin.");
}

/// A bad script file must never take the booth down: it warns and runs the
/// built-in decks instead.
#[test]
fn booth_falls_back_to_builtin_decks_on_a_bad_script_file() {
    init_logger();
    let tmp = TempDir::new().expect("create temp dir");
    let garbled = tmp.path().join("garbled.json");
    fs::write(&garbled, "not json at all").unwrap();

    let mut config = fast_config();
    config.script_path = Some(garbled.display().to_string());
    let booth = Booth::new(Arc::new(MemoryStage::new()), &config);

    let builtin = ScriptSet::builtin();
    assert_eq!(booth.scripts.primary.opening, builtin.primary.opening);
    assert_eq!(booth.scripts.secondary.card.back, builtin.secondary.card.back);
}
