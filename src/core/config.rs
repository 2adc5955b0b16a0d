use crate::core::types::{BranchMode, CameraPlacement, Timings};
use std::time::Duration;

// ---------------------------------------------------------------------------
// BoothConfig — file-based config loader (mirror-booth.json) with env-var fallback
// ---------------------------------------------------------------------------

/// Top-level config loaded from `mirror-booth.json`.
///
/// Every field is optional: a missing field falls back to an env var, then to
/// a hardcoded default, so an empty (or absent) config file is a valid one.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct BoothConfig {
    /// Typewriter cadence in milliseconds per character. Default: 30.
    pub type_interval_ms: Option<u64>,
    /// Read hold after a phrase is fully typed, in ms. The source kiosks
    /// drifted between 900 and 2500; 1500 is the shipped default.
    pub read_hold_ms: Option<u64>,
    /// Fade-out duration in ms. Default: 600.
    pub fade_out_ms: Option<u64>,
    /// Fade-in duration in ms (selfie frame). Default: 800.
    pub fade_in_ms: Option<u64>,
    /// How long a successful camera frame stays up, in ms. Default: 4000.
    pub camera_hold_ms: Option<u64>,
    /// Settle delay after metadata-ready before the frame grab. Default: 300.
    pub camera_settle_ms: Option<u64>,
    /// `off` | `before_device_info` | `after_device_info`. Default: after.
    pub camera_placement: Option<CameraPlacement>,
    /// `choice` | `card`. Default: choice.
    pub branch: Option<BranchMode>,
    /// Number of glyphs in the falling-digits field. Default: 150.
    pub rain_glyphs: Option<usize>,
    /// Whether the prober performs the best-effort ISP/city lookup.
    /// Default: true.
    pub geo_lookup: Option<bool>,
    /// Path to a custom phrase-script JSON file. When unset, the built-in
    /// French/Dutch decks are used.
    pub script_path: Option<String>,
}

fn env_ms(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

impl BoothConfig {
    /// Typewriter cadence: JSON field → `MIRROR_BOOTH_TYPE_INTERVAL_MS` → 30.
    pub fn resolve_type_interval_ms(&self) -> u64 {
        self.type_interval_ms
            .or_else(|| env_ms("MIRROR_BOOTH_TYPE_INTERVAL_MS"))
            .unwrap_or(30)
    }

    /// Read hold: JSON field → `MIRROR_BOOTH_READ_HOLD_MS` → 1500.
    pub fn resolve_read_hold_ms(&self) -> u64 {
        self.read_hold_ms
            .or_else(|| env_ms("MIRROR_BOOTH_READ_HOLD_MS"))
            .unwrap_or(1500)
    }

    /// Fade-out: JSON field → `MIRROR_BOOTH_FADE_OUT_MS` → 600.
    pub fn resolve_fade_out_ms(&self) -> u64 {
        self.fade_out_ms
            .or_else(|| env_ms("MIRROR_BOOTH_FADE_OUT_MS"))
            .unwrap_or(600)
    }

    /// Fade-in: JSON field → `MIRROR_BOOTH_FADE_IN_MS` → 800.
    pub fn resolve_fade_in_ms(&self) -> u64 {
        self.fade_in_ms
            .or_else(|| env_ms("MIRROR_BOOTH_FADE_IN_MS"))
            .unwrap_or(800)
    }

    /// Camera hold: JSON field → `MIRROR_BOOTH_CAMERA_HOLD_MS` → 4000.
    pub fn resolve_camera_hold_ms(&self) -> u64 {
        self.camera_hold_ms
            .or_else(|| env_ms("MIRROR_BOOTH_CAMERA_HOLD_MS"))
            .unwrap_or(4000)
    }

    /// Camera settle: JSON field → `MIRROR_BOOTH_CAMERA_SETTLE_MS` → 300.
    pub fn resolve_camera_settle_ms(&self) -> u64 {
        self.camera_settle_ms
            .or_else(|| env_ms("MIRROR_BOOTH_CAMERA_SETTLE_MS"))
            .unwrap_or(300)
    }

    /// Camera placement: JSON field → `MIRROR_BOOTH_CAMERA` env var
    /// (`off` / `before` / `after`) → after the device-info segment.
    pub fn resolve_camera_placement(&self) -> CameraPlacement {
        if let Some(p) = self.camera_placement {
            return p;
        }
        match std::env::var("MIRROR_BOOTH_CAMERA") {
            Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
                "off" | "0" | "false" | "no" => CameraPlacement::Off,
                "before" | "before_device_info" => CameraPlacement::BeforeDeviceInfo,
                _ => CameraPlacement::AfterDeviceInfo,
            },
            Err(_) => CameraPlacement::default(),
        }
    }

    /// Branch mode: JSON field → `MIRROR_BOOTH_BRANCH` (`choice`/`card`) → choice.
    pub fn resolve_branch(&self) -> BranchMode {
        if let Some(b) = self.branch {
            return b;
        }
        match std::env::var("MIRROR_BOOTH_BRANCH") {
            Ok(v) if v.trim().eq_ignore_ascii_case("card") => BranchMode::Card,
            _ => BranchMode::default(),
        }
    }

    /// Rain field size: JSON field → `MIRROR_BOOTH_RAIN_GLYPHS` → 150.
    pub fn resolve_rain_glyphs(&self) -> usize {
        if let Some(n) = self.rain_glyphs {
            return n;
        }
        std::env::var("MIRROR_BOOTH_RAIN_GLYPHS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(150)
    }

    /// Whether the geo lookup runs: JSON field → `MIRROR_BOOTH_GEO`
    /// (set to "0" to disable) → true.
    pub fn resolve_geo_lookup(&self) -> bool {
        if let Some(b) = self.geo_lookup {
            return b;
        }
        std::env::var("MIRROR_BOOTH_GEO")
            .map(|v| v.trim() != "0")
            .unwrap_or(true)
    }

    /// Collapse the timing fields into the immutable set the sequencer uses.
    pub fn timings(&self) -> Timings {
        Timings {
            type_interval: Duration::from_millis(self.resolve_type_interval_ms()),
            read_hold: Duration::from_millis(self.resolve_read_hold_ms()),
            fade_out: Duration::from_millis(self.resolve_fade_out_ms()),
            fade_in: Duration::from_millis(self.resolve_fade_in_ms()),
            camera_hold: Duration::from_millis(self.resolve_camera_hold_ms()),
            camera_settle: Duration::from_millis(self.resolve_camera_settle_ms()),
        }
    }
}

/// Load `mirror-booth.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `MIRROR_BOOTH_CONFIG` env var path
/// 2. `./mirror-booth.json` (process cwd)
/// 3. `../mirror-booth.json` (one level up, when running from a subdir)
///
/// Missing file → `BoothConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `BoothConfig::default()`.
pub fn load_booth_config() -> BoothConfig {
    let candidates: Vec<std::path::PathBuf> = {
        let mut v = vec![
            std::path::PathBuf::from("mirror-booth.json"),
            std::path::PathBuf::from("../mirror-booth.json"),
        ];
        if let Ok(env_path) = std::env::var("MIRROR_BOOTH_CONFIG") {
            v.insert(0, std::path::PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<BoothConfig>(&contents) {
                Ok(cfg) => {
                    tracing::info!("mirror-booth.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "mirror-booth.json parse error at {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    return BoothConfig::default();
                }
            },
            Err(_) => continue, // file not found at this path — try next
        }
    }

    // No config file found anywhere — silently use defaults.
    BoothConfig::default()
}
