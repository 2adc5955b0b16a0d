//! Environment prober.
//!
//! Resolves a descriptive record of the visitor's machine for the
//! device-info phrase segment. Contract (the sequencer relies on it): the
//! probe **never fails** — any introspection error degrades to the
//! locale-appropriate "unknown" placeholder and the narrative continues
//! with fewer facts.
//!
//! The heuristics themselves stay shallow on purpose: the point is a few
//! plausible-looking lines, not fingerprinting accuracy.

use crate::core::types::{EnvironmentSnapshot, Language};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

pub mod geo;

/// Injected dependency of the sequencer. Exactly one probe per run, awaited
/// before the device-info segment renders.
#[async_trait]
pub trait EnvironmentProber: Send + Sync {
    async fn probe(&self, language: Language) -> EnvironmentSnapshot;
}

/// Locale-appropriate "unknown" strings, same wording as the original decks.
pub fn placeholders(language: Language) -> EnvironmentSnapshot {
    match language {
        Language::Primary => EnvironmentSnapshot {
            device: "Appareil inconnu".to_string(),
            os: "Système inconnu".to_string(),
            browser: "Navigateur inconnu".to_string(),
            battery: None,
            location_hint: None,
        },
        Language::Secondary => EnvironmentSnapshot {
            device: "Onbekend apparaat".to_string(),
            os: "Onbekend systeem".to_string(),
            browser: "Onbekende browser".to_string(),
            battery: None,
            location_hint: None,
        },
    }
}

/// Prober that never finds anything — every field stays at its placeholder.
/// Useful for demos on machines that should not be introspected.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlindProber;

#[async_trait]
impl EnvironmentProber for BlindProber {
    async fn probe(&self, language: Language) -> EnvironmentSnapshot {
        placeholders(language)
    }
}

/// Real prober: host introspection plus the optional geo lookup.
#[derive(Debug, Default)]
pub struct HostProber {
    geo: Option<geo::GeoClient>,
}

impl HostProber {
    pub fn new(geo_lookup: bool) -> Self {
        Self {
            geo: if geo_lookup { geo::GeoClient::new() } else { None },
        }
    }
}

#[async_trait]
impl EnvironmentProber for HostProber {
    async fn probe(&self, language: Language) -> EnvironmentSnapshot {
        let mut snapshot = placeholders(language);

        if let Some(device) = host_name() {
            snapshot.device = device;
        }
        if let Some(os) = os_description() {
            snapshot.os = os;
        }
        if let Some(term) = terminal_description() {
            snapshot.browser = term;
        }
        snapshot.battery = battery_percent();
        if let Some(geo) = &self.geo {
            snapshot.location_hint = geo.location_hint().await;
        }

        debug!(
            "probe: device={} os={} browser={} battery={:?} location={:?}",
            snapshot.device, snapshot.os, snapshot.browser, snapshot.battery, snapshot.location_hint
        );
        snapshot
    }
}

fn non_empty(s: String) -> Option<String> {
    let s = s.trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn host_name() -> Option<String> {
    if let Some(h) = std::env::var("HOSTNAME").ok().and_then(non_empty) {
        return Some(h);
    }
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .and_then(non_empty)
}

/// Pretty OS name from `/etc/os-release` when present, otherwise the
/// compile-target family plus architecture.
fn os_description() -> Option<String> {
    if Path::new("/etc/os-release").exists() {
        if let Ok(contents) = std::fs::read_to_string("/etc/os-release") {
            for line in contents.lines() {
                if let Some(value) = line.strip_prefix("PRETTY_NAME=") {
                    if let Some(name) = non_empty(value.trim_matches('"').to_string()) {
                        return Some(name);
                    }
                }
            }
        }
    }
    non_empty(format!(
        "{} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH
    ))
}

/// The hosting "browser" of a terminal kiosk is the terminal emulator.
fn terminal_description() -> Option<String> {
    std::env::var("TERM_PROGRAM")
        .ok()
        .and_then(non_empty)
        .or_else(|| std::env::var("TERM").ok().and_then(non_empty))
}

/// First readable `/sys/class/power_supply/*/capacity`, rendered as "NN %".
fn battery_percent() -> Option<String> {
    let entries = std::fs::read_dir("/sys/class/power_supply").ok()?;
    for entry in entries.flatten() {
        let capacity = entry.path().join("capacity");
        if let Ok(raw) = std::fs::read_to_string(&capacity) {
            if let Ok(pct) = raw.trim().parse::<u8>() {
                return Some(format!("{pct} %"));
            }
        }
    }
    None
}
