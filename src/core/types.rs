use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The two copy decks the booth ships with. Exactly one language is active
/// per run; there is no mid-run switch.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// French copy (the mainline in-store deck).
    Primary,
    /// Dutch copy.
    Secondary,
}

/// What the prober learned about the visitor's machine. Produced once per
/// run, immutable afterwards; phrase templates read it, nothing writes it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EnvironmentSnapshot {
    pub device: String,
    pub os: String,
    pub browser: String,
    #[serde(default)]
    pub battery: Option<String>,
    /// Best-effort ISP/city hint from the geolocation lookup.
    #[serde(default)]
    pub location_hint: Option<String>,
}

/// One camera frame, already encoded, with every underlying media track
/// stopped before this value exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaptureResult {
    /// `data:image/png;base64,...` — empty when `succeeded` is false.
    pub image_data: String,
    pub succeeded: bool,
    #[serde(default)]
    pub captured_at: Option<String>,
}

impl CaptureResult {
    pub fn failed() -> Self {
        Self {
            image_data: String::new(),
            succeeded: false,
            captured_at: None,
        }
    }
}

/// The visitor's pick on the choice branch.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeChoice {
    Protect,
    Ignore,
}

/// Fixed icon + message pair rendered after a choice. One per choice, no
/// further branching, no undo.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub icon: String,
    pub message: String,
    pub tone: VerdictTone,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerdictTone {
    Reassuring,
    Grim,
}

/// Where (and whether) the camera step runs relative to the device-info
/// segment. The source kiosks disagreed on this; here it is configuration.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraPlacement {
    Off,
    BeforeDeviceInfo,
    #[default]
    AfterDeviceInfo,
}

/// Which terminal presentation closes the run. Mutually exclusive per script.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BranchMode {
    #[default]
    Choice,
    Card,
}

/// Resolved timing set handed to the sequencer. Built once from
/// `BoothConfig`, constant for the whole run.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    /// Per-character cadence of the typewriter reveal.
    pub type_interval: Duration,
    /// How long a fully-typed phrase stays on screen before fading.
    pub read_hold: Duration,
    pub fade_out: Duration,
    pub fade_in: Duration,
    /// How long a successful camera frame stays on screen.
    pub camera_hold: Duration,
    /// Settle delay after the stream reports metadata-ready, before the grab.
    pub camera_settle: Duration,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Choice branch: the visitor picked, the verdict was shown.
    Decided(OutcomeChoice),
    /// Card branch: the reward card was revealed (flips are cosmetic).
    CardShown,
}
