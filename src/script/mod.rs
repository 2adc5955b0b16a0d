//! Phrase scripts.
//!
//! All copy lives here as data: the opening/device-info/closing segments,
//! the selfie captions, the choice prompt with its two verdicts, and the
//! reward-card faces. Two decks ship built in (French is the mainline,
//! Dutch the secondary); a custom deck can be loaded from JSON via
//! `script_path` in `mirror-booth.json`.
//!
//! Device-info lines are templates over the environment snapshot:
//! `{device}`, `{os}`, `{browser}` always render; `{battery}` and
//! `{location}` drop their whole line when the snapshot has no value —
//! a degraded probe just means fewer typed facts.

use crate::core::types::{EnvironmentSnapshot, Language, Verdict, VerdictTone};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot read script file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("script file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Copy for the two-button terminal branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceCopy {
    pub prompt: String,
    pub protect_label: String,
    pub ignore_label: String,
    pub protect_verdict: Verdict,
    pub ignore_verdict: Verdict,
}

/// Copy for the flip-card terminal branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardCopy {
    pub front: String,
    pub back: String,
}

/// One language's complete deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseScript {
    pub opening: Vec<String>,
    /// Templates — see module docs for the placeholder rules.
    pub device_info: Vec<String>,
    pub closing: Vec<String>,
    pub selfie_caption: String,
    pub selfie_disclaimer: String,
    /// When present, a failed capture types this line in-narrative instead
    /// of skipping silently.
    #[serde(default)]
    pub camera_failure_line: Option<String>,
    pub choice: ChoiceCopy,
    pub card: CardCopy,
}

impl PhraseScript {
    /// Render the device-info segment against a snapshot. Lines whose
    /// optional placeholder has no value are dropped.
    pub fn render_device_info(&self, snapshot: &EnvironmentSnapshot) -> Vec<String> {
        self.device_info
            .iter()
            .filter_map(|line| render_line(line, snapshot))
            .collect()
    }
}

fn render_line(template: &str, snapshot: &EnvironmentSnapshot) -> Option<String> {
    let mut line = template.to_string();
    if line.contains("{battery}") {
        line = line.replace("{battery}", snapshot.battery.as_deref()?);
    }
    if line.contains("{location}") {
        line = line.replace("{location}", snapshot.location_hint.as_deref()?);
    }
    Some(
        line.replace("{device}", &snapshot.device)
            .replace("{os}", &snapshot.os)
            .replace("{browser}", &snapshot.browser),
    )
}

/// The per-language deck table for one booth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSet {
    pub primary: PhraseScript,
    pub secondary: PhraseScript,
}

impl ScriptSet {
    pub fn for_language(&self, language: Language) -> &PhraseScript {
        match language {
            Language::Primary => &self.primary,
            Language::Secondary => &self.secondary,
        }
    }

    /// Load a custom deck pair from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ScriptError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ScriptError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// The shipped decks, copy unchanged from the in-store original.
    pub fn builtin() -> Self {
        ScriptSet {
            primary: PhraseScript {
                opening: vec![
                    "Tu penses être protégé ?".to_string(),
                    "Et pourtant voilà ce qu’on a récupéré de ton appareil…".to_string(),
                ],
                device_info: vec![
                    "Identifiant Appareil : {device}".to_string(),
                    "Système : {os}".to_string(),
                    "Navigateur : {browser}".to_string(),
                    "Batterie : {battery}".to_string(),
                    "Connexion : {location}".to_string(),
                ],
                closing: vec![
                    "Un hacker mettrait 30 secondes à faire pire.".to_string(),
                    "C’est pour ça qu’on a créé le Digital Service Pack.".to_string(),
                ],
                selfie_caption:
                    "Et ça, c’est ta tête quand tu réalises que tes infos sont pas si protégées…"
                        .to_string(),
                selfie_disclaimer: "Rien n’est stocké, pas de panique.".to_string(),
                camera_failure_line: None,
                choice: ChoiceCopy {
                    prompt: "Maintenant que tu sais ça…".to_string(),
                    protect_label: "Protéger mes données avec le DSP".to_string(),
                    ignore_label: "Ignorer et espérer que ça n’arrive jamais".to_string(),
                    protect_verdict: Verdict {
                        icon: "🛡".to_string(),
                        message: "Bonne idée, approche-toi d’un vendeur.".to_string(),
                        tone: VerdictTone::Reassuring,
                    },
                    ignore_verdict: Verdict {
                        icon: "☠".to_string(),
                        message: "Mauvaise idée, tu devrais aller voir un vendeur.".to_string(),
                        tone: VerdictTone::Grim,
                    },
                },
                card: CardCopy {
                    front: "Tu as gagné une analyse de sécurité offerte.".to_string(),
                    back: "Montre cet écran à un vendeur pour ta récompense.".to_string(),
                },
            },
            secondary: PhraseScript {
                opening: vec![
                    "Denk je dat je beschermd bent?".to_string(),
                    "Dit hebben we gevonden:".to_string(),
                ],
                device_info: vec![
                    "Apparaat: {device}".to_string(),
                    "Systeem: {os}".to_string(),
                    "Browser: {browser}".to_string(),
                    "Batterij: {battery}".to_string(),
                    "Verbinding: {location}".to_string(),
                ],
                closing: vec![
                    "Een hacker zou erger doen in 30 seconden.".to_string(),
                    "Daarom hebben we de Digital Service Pack ontwikkeld.".to_string(),
                ],
                selfie_caption:
                    "En dit is je gezicht als je beseft dat je gegevens niet zo veilig zijn…"
                        .to_string(),
                selfie_disclaimer: "Niets wordt opgeslagen, geen paniek.".to_string(),
                camera_failure_line: None,
                choice: ChoiceCopy {
                    prompt: "Nu je dit weet…".to_string(),
                    protect_label: "Bescherm mijn gegevens met de DSP".to_string(),
                    ignore_label: "Negeer en hoop dat het nooit gebeurt".to_string(),
                    protect_verdict: Verdict {
                        icon: "🛡".to_string(),
                        message: "Goed idee, spreek een verkoper aan.".to_string(),
                        tone: VerdictTone::Reassuring,
                    },
                    ignore_verdict: Verdict {
                        icon: "☠".to_string(),
                        message: "Slecht idee, je zou een verkoper moeten spreken.".to_string(),
                        tone: VerdictTone::Grim,
                    },
                },
                card: CardCopy {
                    front: "Je hebt een gratis veiligheidscheck gewonnen.".to_string(),
                    back: "Laat dit scherm aan een verkoper zien voor je beloning.".to_string(),
                },
            },
        }
    }
}
